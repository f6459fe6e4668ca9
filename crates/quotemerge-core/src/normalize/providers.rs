//! Per-provider payload layouts.

use super::raw::RawQuote;
use crate::domain::market::{
    detect_board, detect_market, is_chinext_code, is_kcb_code, is_st_name, MARKET_SH, MARKET_SZ,
};
use crate::domain::{QuoteRecord, QuoteRecordBuilder, StockCode};
use crate::{SourceId, ValidationError};

pub(crate) fn normalize_raw(
    source: SourceId,
    raw: RawQuote<'_>,
) -> Result<QuoteRecord, ValidationError> {
    match source {
        SourceId::Eastmoney | SourceId::Baostock | SourceId::Joinquant => eastmoney(source, raw),
        SourceId::Tencent => tencent(raw),
        SourceId::Sina => sina(raw),
        SourceId::Akshare => akshare(raw),
        SourceId::Tushare => tushare(raw),
    }
}

/// Builder carrying the code-derived classification shared by every layout.
fn classified(
    raw: &RawQuote<'_>,
    source: SourceId,
) -> Result<(StockCode, QuoteRecordBuilder), ValidationError> {
    let code = StockCode::parse(&raw.code()?)?;
    let name = raw.name();

    let builder = QuoteRecord::builder(code.as_str(), source)
        .is_st(is_st_name(&name))
        .is_chinext(is_chinext_code(&code))
        .is_kcb(is_kcb_code(&code))
        .market(detect_market(&code))
        .board(detect_board(&code))
        .name(name);
    Ok((code, builder))
}

/// The `f`-code layout; also used by baostock and joinquant.
fn eastmoney(source: SourceId, raw: RawQuote<'_>) -> Result<QuoteRecord, ValidationError> {
    let (_, builder) = classified(&raw, source)?;
    let price = raw.float(&["f2"]);
    let volume = raw.count("volume", &["f5"])?;

    builder
        .price(price)
        .change_percent(raw.float(&["f3"]))
        .change_amount(raw.float(&["f4"]))
        .volume(volume)
        .amount(raw.float(&["f6"]))
        .turnover_rate(raw.float(&["f8"]))
        .high(raw.float(&["f15"]))
        .low(raw.float(&["f16"]))
        .open(raw.float(&["f17"]))
        .pre_close(raw.float(&["f18"]))
        .market_cap(raw.float(&["f20"]))
        .total_cap(raw.float(&["f21"]))
        .suspended(price == 0.0 && volume == 0)
        .build()
}

fn tencent(raw: RawQuote<'_>) -> Result<QuoteRecord, ValidationError> {
    let (code, mut builder) = classified(&raw, SourceId::Tencent)?;
    let price = raw.float(&["f2", "price"]);
    let volume = raw.count("volume", &["f5", "volume"])?;

    // A numeric market id is 0 for Shenzhen, anything else for Shanghai.
    let market = raw.text(&["market"]);
    if !market.is_empty() {
        let market = match market.parse::<u64>() {
            Ok(0) => MARKET_SZ.to_owned(),
            Ok(_) => MARKET_SH.to_owned(),
            Err(_) => market,
        };
        builder = builder.market(market);
    }

    let board = raw.text(&["market_board", "board"]);
    if !board.is_empty() {
        builder = builder.board(board);
    }

    builder
        .price(price)
        .high(raw.float(&["f15", "high", "f4"]))
        .low(raw.float(&["f16", "low", "f34"]))
        .open(raw.float(&["f17", "open", "f5"]))
        .pre_close(raw.float(&["f18", "pre_close"]))
        .change_percent(raw.float(&["f3", "change_percent"]))
        .volume(volume)
        .amount(raw.float(&["f6", "amount"]))
        .turnover_rate(raw.float(&["f8", "turnover_rate"]))
        .market_cap(raw.float(&["f20", "market_cap"]))
        .total_cap(raw.float(&["f21", "total_cap"]))
        .sector(raw.text(&["sector", "industry"]))
        .is_chinext(raw.flag("is_chinext").unwrap_or_else(|| is_chinext_code(&code)))
        .suspended(price == 0.0 && volume == 0)
        .build()
}

/// Sina and akshare both put the high in `f4` and the open in `f15`.
fn swapped_layout(
    raw: &RawQuote<'_>,
    builder: QuoteRecordBuilder,
) -> Result<QuoteRecord, ValidationError> {
    let price = raw.float(&["f2"]);
    let volume = raw.count("volume", &["f5"])?;

    builder
        .price(price)
        .high(raw.float(&["f4"]))
        .low(raw.float(&["f16"]))
        .open(raw.float(&["f15"]))
        .pre_close(raw.float(&["f18"]))
        .change_percent(raw.float(&["f3"]))
        .volume(volume)
        .amount(raw.float(&["f6"]))
        .turnover_rate(raw.float(&["f8"]))
        .suspended(price == 0.0 && volume == 0)
        .build()
}

fn sina(raw: RawQuote<'_>) -> Result<QuoteRecord, ValidationError> {
    let (_, builder) = classified(&raw, SourceId::Sina)?;
    swapped_layout(&raw, builder)
}

fn akshare(raw: RawQuote<'_>) -> Result<QuoteRecord, ValidationError> {
    let (code, builder) = classified(&raw, SourceId::Akshare)?;
    let builder =
        builder.is_chinext(raw.flag("is_chinext").unwrap_or_else(|| is_chinext_code(&code)));
    swapped_layout(&raw, builder)
}

fn tushare(raw: RawQuote<'_>) -> Result<QuoteRecord, ValidationError> {
    let (_, builder) = classified(&raw, SourceId::Tushare)?;
    let price = raw.float(&["f2", "close", "price"]);

    builder
        .price(price)
        .change_percent(raw.float(&["f3", "pct_chg"]))
        .volume(raw.count("volume", &["f5", "vol", "volume"])?)
        .amount(raw.float(&["f6", "amount"]))
        .turnover_rate(raw.float(&["f8", "turnover_rate"]))
        .high(raw.float(&["f15", "high"]))
        .low(raw.float(&["f16", "low"]))
        .open(raw.float(&["f17", "open"]))
        .pre_close(raw.float(&["f18", "pre_close"]))
        .market_cap(raw.float(&["f20", "circ_mv"]))
        .total_cap(raw.float(&["f21", "total_mv"]))
        .sector(raw.text(&["industry", "sector"]))
        .suspended(price == 0.0)
        .build()
}
