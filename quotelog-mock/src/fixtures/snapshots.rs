use quotelog_core::Snapshot;

pub fn by_symbol(s: &str) -> Option<Snapshot> {
    match s {
        "AAPL" => Some(equity("AAPL", "Apple Inc.", 190.0, 188.0, 189.95, 190.05)),
        "MSFT" => Some(equity("MSFT", "Microsoft Corp", 420.0, 418.0, 419.9, 420.1)),
        "KO" => Some(equity("KO", "Coca-Cola", 60.0, 59.5, 59.99, 60.01)),
        // Mutual funds report a net asset value instead of a trading price.
        "VFIAX" => Some(
            Snapshot::new()
                .with("symbol", "VFIAX")
                .with("shortName", "Vanguard 500 Index Admiral")
                .with("currency", "USD")
                .with("navPrice", 512.34)
                .with("previousClose", 510.12),
        ),
        _ => None,
    }
}

fn equity(sym: &str, name: &str, px: f64, prev: f64, bid: f64, ask: f64) -> Snapshot {
    Snapshot::new()
        .with("symbol", sym)
        .with("shortName", name)
        .with("currency", "USD")
        .with("currentPrice", px)
        .with("previousClose", prev)
        .with("bid", bid)
        .with("ask", ask)
}
