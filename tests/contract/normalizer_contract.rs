use quotemerge_core::{normalize, QuoteRecord, SourceId, ValidationError};
use serde_json::{json, Value};

#[derive(Clone)]
struct LayoutCase {
    source: SourceId,
    payload: Value,
    price: f64,
    high: f64,
    open: f64,
    volume: u64,
}

fn layout_cases() -> Vec<LayoutCase> {
    let f_layout = json!({
        "f12": "600000", "f14": "浦发银行",
        "f2": 10.5, "f3": 1.2, "f4": 0.12, "f5": 120000, "f6": 1.26e6,
        "f8": 0.4, "f15": 10.6, "f16": 10.3, "f17": 10.35, "f18": 10.38,
        "f20": 3.0e11, "f21": 3.1e11,
    });
    let swapped = json!({
        "f12": "600000", "f14": "浦发银行",
        "f2": 10.5, "f3": 1.2, "f4": 10.6, "f5": 120000, "f6": 1.26e6,
        "f8": 0.4, "f15": 10.35, "f16": 10.3, "f18": 10.38,
    });

    let mut cases: Vec<LayoutCase> = [SourceId::Eastmoney, SourceId::Baostock, SourceId::Joinquant]
        .into_iter()
        .map(|source| LayoutCase {
            source,
            payload: f_layout.clone(),
            price: 10.5,
            high: 10.6,
            open: 10.35,
            volume: 120000,
        })
        .collect();

    cases.extend([SourceId::Sina, SourceId::Akshare].into_iter().map(|source| LayoutCase {
        source,
        payload: swapped.clone(),
        price: 10.5,
        high: 10.6,
        open: 10.35,
        volume: 120000,
    }));

    cases.push(LayoutCase {
        source: SourceId::Tencent,
        payload: json!({
            "code": "600000", "name": "浦发银行", "market": "1",
            "price": 10.5, "high": 10.6, "low": 10.3, "open": 10.35,
            "pre_close": 10.38, "volume": 120000, "sector": "银行",
        }),
        price: 10.5,
        high: 10.6,
        open: 10.35,
        volume: 120000,
    });

    cases.push(LayoutCase {
        source: SourceId::Tushare,
        payload: json!({
            "symbol": "600000", "name": "浦发银行",
            "close": 10.5, "pct_chg": 1.2, "vol": 120000, "high": 10.6,
            "open": 10.35, "circ_mv": 3.0e11, "total_mv": 3.1e11, "industry": "银行",
        }),
        price: 10.5,
        high: 10.6,
        open: 10.35,
        volume: 120000,
    });

    cases
}

fn normalized(case: &LayoutCase) -> QuoteRecord {
    normalize(case.source, &case.payload).unwrap_or_else(|error| {
        panic!("source '{}' failed to normalize: {error}", case.source)
    })
}

// =============================================================================
// Contract: every provider layout
// =============================================================================

#[test]
fn every_layout_yields_a_valid_classified_record() {
    for case in layout_cases() {
        let record = normalized(&case);

        assert_eq!(record.code().as_str(), "600000", "source '{}'", case.source);
        assert_eq!(record.name(), "浦发银行", "source '{}'", case.source);
        assert_eq!(record.source(), case.source);
        assert_eq!(record.market(), "SH", "source '{}': market", case.source);
        assert_eq!(record.board(), "沪A", "source '{}': board", case.source);
        assert!(record.is_valid(), "source '{}': valid", case.source);
        assert!(!record.suspended(), "source '{}': suspended", case.source);
        assert!(!record.is_st());
        assert!(!record.is_kcb());
        assert!(!record.is_chinext());
        assert_eq!(record.quality_score(), 1.0);
    }
}

#[test]
fn every_layout_maps_its_own_price_columns() {
    for case in layout_cases() {
        let record = normalized(&case);

        assert_eq!(record.price(), case.price, "source '{}': price", case.source);
        assert_eq!(record.high(), case.high, "source '{}': high", case.source);
        assert_eq!(record.open(), case.open, "source '{}': open", case.source);
        assert_eq!(record.volume(), case.volume, "source '{}': volume", case.source);
    }
}

#[test]
fn f_layout_carries_capitalization_and_change_amount() {
    let case = &layout_cases()[0];
    let record = normalized(case);

    assert_eq!(record.change_amount(), 0.12);
    assert_eq!(record.change_percent(), 1.2);
    assert_eq!(record.turnover_rate(), 0.4);
    assert_eq!(record.market_cap(), 3.0e11);
    assert_eq!(record.total_cap(), 3.1e11);
    assert_eq!(record.pre_close(), 10.38);
}

#[test]
fn swapped_layout_has_no_capitalization() {
    let record = normalize(
        SourceId::Sina,
        &json!({"f12": "600000", "f2": 10.5, "f4": 10.6, "f15": 10.35, "f20": 3.0e11}),
    )
    .expect("sina payload");

    assert_eq!(record.high(), 10.6);
    assert_eq!(record.open(), 10.35);
    assert_eq!(record.market_cap(), 0.0);
    assert_eq!(record.change_amount(), 0.0);
}

#[test]
fn tushare_takes_sector_from_industry() {
    let case = layout_cases()
        .into_iter()
        .find(|case| case.source == SourceId::Tushare)
        .expect("tushare case");
    let record = normalized(&case);

    assert_eq!(record.sector(), "银行");
    assert_eq!(record.market_cap(), 3.0e11);
    assert_eq!(record.total_cap(), 3.1e11);
    assert_eq!(record.change_percent(), 1.2);
}

// =============================================================================
// Contract: classification
// =============================================================================

#[test]
fn code_prefix_decides_board_and_flags() {
    let cases = [
        ("688981", "科创板", "SH", true, false),
        ("300750", "创业板", "SZ", false, true),
        ("830799", "北交所", "BJ", false, false),
        ("000001", "深A", "SZ", false, false),
        ("601318", "沪A", "SH", false, false),
    ];

    for (code, board, market, kcb, chinext) in cases {
        let record = normalize(SourceId::Eastmoney, &json!({"f12": code, "f2": 1.0}))
            .unwrap_or_else(|error| panic!("{code}: {error}"));
        assert_eq!(record.board(), board, "{code}");
        assert_eq!(record.market(), market, "{code}");
        assert_eq!(record.is_kcb(), kcb, "{code}");
        assert_eq!(record.is_chinext(), chinext, "{code}");
    }
}

#[test]
fn st_names_are_flagged() {
    for name in ["ST康美", "*ST华仪", "st 测试"] {
        let record = normalize(SourceId::Eastmoney, &json!({"f12": "600518", "f14": name}))
            .expect("eastmoney payload");
        assert!(record.is_st(), "{name}");
    }
}

#[test]
fn tencent_numeric_market_zero_means_shenzhen() {
    let record = normalize(
        SourceId::Tencent,
        &json!({"code": "000001", "market": 0, "price": 11.0, "market_board": "深主板"}),
    )
    .expect("tencent payload");

    assert_eq!(record.market(), "SZ");
    assert_eq!(record.board(), "深主板");
}

#[test]
fn explicit_chinext_flag_overrides_the_code() {
    let record = normalize(
        SourceId::Akshare,
        &json!({"f12": "000001", "f2": 11.0, "is_chinext": "True"}),
    )
    .expect("akshare payload");
    assert!(record.is_chinext());
}

// =============================================================================
// Contract: tolerant parsing
// =============================================================================

#[test]
fn exchange_prefixed_codes_are_stripped() {
    for code in ["sh600000", "SZ000001", "bj830799"] {
        let record = normalize(SourceId::Tencent, &json!({"code": code, "price": 1.0}))
            .unwrap_or_else(|error| panic!("{code}: {error}"));
        assert_eq!(record.code().as_str(), &code[2..]);
    }
}

#[test]
fn placeholders_and_numeric_strings_are_accepted() {
    let record = normalize(
        SourceId::Eastmoney,
        &json!({"f12": "000001", "f2": "10.50", "f3": "-", "f5": "1200.9", "f20": null}),
    )
    .expect("eastmoney payload");

    assert_eq!(record.price(), 10.5);
    assert_eq!(record.change_percent(), 0.0);
    assert_eq!(record.volume(), 1200);
    assert_eq!(record.market_cap(), 0.0);
}

#[test]
fn zero_price_and_volume_mark_the_record_suspended() {
    let record = normalize(SourceId::Eastmoney, &json!({"f12": "000001", "f2": "-"}))
        .expect("eastmoney payload");
    assert!(record.suspended());
    assert!(!record.is_valid());

    let record = normalize(SourceId::Tushare, &json!({"ts_code": "x", "symbol": "000001", "vol": 10}))
        .expect("tushare payload");
    assert!(record.suspended());
}

#[test]
fn missing_or_malformed_codes_are_rejected() {
    let missing = normalize(SourceId::Eastmoney, &json!({"f14": "名称", "f2": 1.0}));
    assert!(matches!(missing, Err(ValidationError::MissingCode)));

    let malformed = normalize(SourceId::Eastmoney, &json!({"f12": "60000A"}));
    assert!(matches!(malformed, Err(ValidationError::InvalidCode { .. })));

    let not_object = normalize(SourceId::Eastmoney, &json!([1, 2, 3]));
    assert!(matches!(not_object, Err(ValidationError::NotAnObject)));
}

#[test]
fn negative_prices_are_rejected() {
    let result = normalize(SourceId::Eastmoney, &json!({"f12": "000001", "f2": -1.0}));
    assert!(matches!(
        result,
        Err(ValidationError::NegativeValue { field: "price" })
    ));
}
