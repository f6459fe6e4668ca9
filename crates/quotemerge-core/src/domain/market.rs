//! Exchange and board classification derived from the instrument code.

use super::StockCode;

pub const MARKET_SH: &str = "SH";
pub const MARKET_SZ: &str = "SZ";
pub const MARKET_BJ: &str = "BJ";

/// Science and technology innovation board (STAR).
pub const BOARD_STAR: &str = "科创板";
/// Growth enterprise board (ChiNext).
pub const BOARD_CHINEXT: &str = "创业板";
/// Beijing stock exchange.
pub const BOARD_BSE: &str = "北交所";
/// Shanghai main board.
pub const BOARD_SH_MAIN: &str = "沪A";
/// Shenzhen main board.
pub const BOARD_SZ_MAIN: &str = "深A";

const STAR_PREFIXES: [&str; 2] = ["688", "689"];
const CHINEXT_PREFIXES: [&str; 2] = ["300", "301"];
const BSE_PREFIXES: [&str; 2] = ["8", "4"];

/// Map a provider's market label onto `SH`, `SZ` or `BJ`.
///
/// Matching is case-insensitive. Unrecognized labels are returned uppercased;
/// an empty label stays empty.
pub fn normalize_market(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let upper = trimmed.to_uppercase();
    let mapped = match upper.as_str() {
        "SH" | "上海" | "沪" | "1" => MARKET_SH,
        "SZ" | "深圳" | "深" | "0" => MARKET_SZ,
        "BJ" | "北京" | "北" => MARKET_BJ,
        _ => return upper,
    };
    mapped.to_owned()
}

/// Board label for a code; the first matching prefix rule wins.
pub fn detect_board(code: &StockCode) -> &'static str {
    if code.starts_with_any(&STAR_PREFIXES) {
        BOARD_STAR
    } else if code.starts_with_any(&CHINEXT_PREFIXES) {
        BOARD_CHINEXT
    } else if code.starts_with_any(&BSE_PREFIXES) {
        BOARD_BSE
    } else if code.starts_with_any(&["6"]) {
        BOARD_SH_MAIN
    } else {
        BOARD_SZ_MAIN
    }
}

/// Exchange for a code, or `""` when the prefix is not recognized.
pub fn detect_market(code: &StockCode) -> &'static str {
    if code.starts_with_any(&["6"]) {
        MARKET_SH
    } else if code.starts_with_any(&["0", "3"]) {
        MARKET_SZ
    } else if code.starts_with_any(&BSE_PREFIXES) {
        MARKET_BJ
    } else {
        ""
    }
}

pub fn is_chinext_code(code: &StockCode) -> bool {
    code.starts_with_any(&CHINEXT_PREFIXES)
}

pub fn is_kcb_code(code: &StockCode) -> bool {
    code.starts_with_any(&STAR_PREFIXES)
}

/// Special-treatment names carry an `ST` marker (`ST`, `*ST`, `st`).
pub fn is_st_name(name: &str) -> bool {
    name.to_uppercase().contains("ST")
}
