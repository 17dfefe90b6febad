//! Human-readable rendering of emitted signals.

use signal_core::types::{Signal, SignalSide};
use signal_indicators::RsiZone;

/// Format a price for display.
///
/// Non-finite and zero prices render as `N/A`; sub-cent prices keep eight
/// decimals, sub-unit prices four, everything else two.
pub fn format_price(price: f64) -> String {
    if !price.is_finite() || price == 0.0 {
        return "N/A".to_string();
    }
    let magnitude = price.abs();
    if magnitude < 0.01 {
        format!("{:.8}", price)
    } else if magnitude < 1.0 {
        format!("{:.4}", price)
    } else {
        format!("{:.2}", price)
    }
}

fn badge(instrument: &str) -> &'static str {
    match instrument {
        "BTCUSDT" => "🟠",
        "ETHUSDT" => "⚫",
        "SOLUSDT" => "🟢",
        "BNBUSDT" => "🟡",
        "XRPUSDT" => "🔵",
        "DOGEUSDT" => "🐶",
        "PEPEUSDT" => "🐸",
        "SHIBUSDT" => "🐕",
        _ => "🔸",
    }
}

fn title(policy: &str) -> String {
    policy.replace('_', " ").to_uppercase()
}

/// Render a signal as a Markdown message.
pub fn format_signal(signal: &Signal) -> String {
    let value = |name: &str| signal.indicator(name);
    let mut msg = String::new();

    msg.push_str(&format!("{} *{}*\n", badge(&signal.instrument), title(&signal.policy)));
    msg.push_str(&format!("*{}* [{}]\n\n", signal.instrument, signal.timeframe));

    let side = match signal.side {
        SignalSide::Long => "🟢 LONG",
        SignalSide::Short => "🔴 SHORT",
    };
    msg.push_str(&format!("{} @ ${}\n", side, format_price(signal.reference_price)));
    msg.push_str(&format!("_{}_\n", signal.reason));

    if let (Some(high), Some(low)) = (value("box_high"), value("box_low")) {
        msg.push_str("\n📦 Range Box\n");
        msg.push_str(&format!("• High: ${}\n", format_price(high)));
        msg.push_str(&format!("• Low:  ${}\n", format_price(low)));
    }

    let mut emas: Vec<(u32, f64)> = signal
        .supporting_indicators
        .iter()
        .filter_map(|(name, v)| {
            let period = name.strip_prefix("ema_")?.parse::<u32>().ok()?;
            Some((period, *v))
        })
        .collect();
    if !emas.is_empty() {
        emas.sort_by_key(|(period, _)| *period);
        msg.push_str("\n📈 EMA\n");
        for (period, v) in emas {
            msg.push_str(&format!("• EMA{}: ${}\n", period, format_price(v)));
        }
    }

    if let (Some(macd), Some(sig)) = (value("macd"), value("macd_signal")) {
        msg.push_str(&format!("\n📉 MACD: {:.6} / Signal: {:.6}\n", macd, sig));
    }
    if let Some(mid) = value("bb_middle") {
        msg.push_str(&format!("📊 BB Middle: ${}\n", format_price(mid)));
    }
    if let Some(rsi) = value("rsi") {
        msg.push_str(&format!("📊 RSI: {:.2} ({})\n", rsi, RsiZone::classify(rsi)));
    }
    if let Some(adx) = value("adx") {
        msg.push_str(&format!("📊 ADX: {:.2}\n", adx));
    }
    if let Some(ratio) = value("volume_ratio") {
        msg.push_str(&format!("📊 Volume: {:.2}x average\n", ratio));
    }

    msg.push_str(&format!("\n🎯 TP: ${}\n", format_price(signal.target_price)));
    msg.push_str(&format!("🛑 SL: ${}", format_price(signal.stop_price)));

    msg
}
