//! Outbound message formatters
//!
//! Pure functions from (payload, language) to display text. Rainfall,
//! trend and priority thresholds are business rules shared with the
//! dashboard and must not drift.

use crate::farmer::Language;
use crate::i18n::messages::{text, MsgId};
use crate::intel::{Advisory, MarketPrice, Simulation, WeatherForecast};
use crate::points::{Reward, RedemptionReceipt};

/// Placeholder for a value the backend did not supply
const MISSING: &str = "\u{2014}";

fn opt_num(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}", v),
        None => MISSING.to_string(),
    }
}

fn opt_str(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(MISSING)
}

/// Rain glyph for a single forecast day.
fn rain_glyph(rainfall_mm: f64) -> &'static str {
    if rainfall_mm > 10.0 {
        "\u{1f327}\u{fe0f}"
    } else if rainfall_mm > 0.0 {
        "\u{1f326}\u{fe0f}"
    } else {
        "\u{2600}\u{fe0f}"
    }
}

/// Planting recommendation from the weekly rainfall total.
fn planting_recommendation(weekly_mm: f64) -> &'static str {
    if weekly_mm > 20.0 {
        "\u{1f4a1} *Good planting conditions!*"
    } else if weekly_mm > 10.0 {
        "\u{1f4a1} *Moderate rainfall expected*"
    } else {
        "\u{1f4a1} *Low rainfall - consider irrigation*"
    }
}

fn priority_glyph(priority: &str) -> &'static str {
    match priority {
        "HIGH" => "\u{1f534}",
        "MEDIUM" => "\u{1f7e1}",
        _ => "\u{1f7e2}",
    }
}

fn trend_glyph(trend: &str) -> &'static str {
    match trend {
        "increasing" => "\u{1f4c8}",
        "decreasing" => "\u{1f4c9}",
        _ => "\u{27a1}\u{fe0f}",
    }
}

/// Main menu with the farmer's current points and level.
pub fn main_menu(points: u32, level: &str, lang: Language) -> String {
    let mut msg = String::new();
    msg.push_str(text(MsgId::MenuTitle, lang));
    msg.push_str("\n\n");

    match lang {
        Language::En => {
            msg.push_str("*Main Menu:*\n");
            msg.push_str("1\u{fe0f}\u{20e3} *Weather Forecast* - Get weather updates\n");
            msg.push_str("2\u{fe0f}\u{20e3} *Farming Advisory* - Crop health and tips\n");
            msg.push_str("3\u{fe0f}\u{20e3} *Market Prices* - View crop prices\n");
            msg.push_str("4\u{fe0f}\u{20e3} *Rewards & Points* - Earn and redeem rewards\n");
            msg.push_str("5\u{fe0f}\u{20e3} *Language* - Switch to Kikuyu\n\n");
        }
        Language::Kik => {
            msg.push_str("*Mũbango:*\n");
            msg.push_str("1\u{fe0f}\u{20e3} *Riera* - Ũhoro wa riera\n");
            msg.push_str("2\u{fe0f}\u{20e3} *Ũtaaro wa Ũrĩmi* - Ũgima wa mĩmera\n");
            msg.push_str("3\u{fe0f}\u{20e3} *Thogora wa Thoko* - Thogora wa irio\n");
            msg.push_str("4\u{fe0f}\u{20e3} *Iheo na Points* - Wĩthũrĩre iheo\n");
            msg.push_str("5\u{fe0f}\u{20e3} *Rũthiomi* - Garũrũka English\n\n");
        }
    }

    msg.push_str(&format!("*Shamba Points:* {}\n", points));
    msg.push_str(&format!("*Level:* {}\n\n", level));

    match lang {
        Language::En => {
            msg.push_str("*Commands:*\n");
            msg.push_str("\u{2022} Type a number (1-5) to select\n");
            msg.push_str("\u{2022} Type \"simulate\" for a yield simulation\n");
            msg.push_str("\u{2022} Type \"menu\" for this menu\n\n");
        }
        Language::Kik => {
            msg.push_str("*Mawatho:*\n");
            msg.push_str("\u{2022} Andĩka namba (1-5)\n");
            msg.push_str("\u{2022} Andĩka \"simulate\" ũciirie magetha\n");
            msg.push_str("\u{2022} Andĩka \"menu\" wone mũbango ũyũ\n\n");
        }
    }

    msg.push_str(text(MsgId::Signature, lang));
    msg
}

/// Weather forecast: current conditions, first three days, weekly total.
pub fn weather(forecast: &WeatherForecast, location: &str, _lang: Language) -> String {
    let mut msg = format!("\u{1f324}\u{fe0f} *Weather for {}*\n\n", location);

    let current = &forecast.current;
    msg.push_str(&format!(
        "*Current:* {}, {}\u{b0}C\n",
        opt_str(&current.conditions),
        opt_num(current.temperature_c)
    ));
    msg.push_str(&format!("Humidity: {}%\n", opt_num(current.humidity_percent)));
    msg.push_str(&format!("Wind: {} km/h\n\n", opt_num(current.wind_speed_kmh)));

    msg.push_str("*7-Day Forecast:*\n");
    for day in forecast.forecast.iter().take(3) {
        msg.push_str(&format!(
            "{} {}: {}, {}-{}\u{b0}C",
            rain_glyph(day.rainfall_mm),
            day.date,
            opt_str(&day.conditions),
            opt_num(day.temp_min_c),
            opt_num(day.temp_max_c)
        ));
        if day.rainfall_mm > 0.0 {
            msg.push_str(&format!(" ({}mm rain)", day.rainfall_mm));
        }
        msg.push('\n');
    }

    let weekly = forecast.weekly_rainfall_mm();
    msg.push_str(&format!("\n*Weekly Rainfall:* {:.0}mm\n", weekly));
    msg.push_str(planting_recommendation(weekly));

    msg
}

/// Advisory: alerts with priority glyphs, recommendations, health score.
pub fn advisory(advisory: &Advisory, _lang: Language) -> String {
    let mut msg = "\u{1f33e} *Farming Advisory*\n\n".to_string();

    if !advisory.alerts.is_empty() {
        msg.push_str("*\u{26a0}\u{fe0f} Alerts:*\n");
        for alert in &advisory.alerts {
            msg.push_str(&format!(
                "{} {}\n{}\n\n",
                priority_glyph(&alert.priority),
                alert.title,
                alert.message
            ));
        }
    }

    if !advisory.recommendations.is_empty() {
        msg.push_str("*\u{1f4a1} Recommendations:*\n");
        for rec in &advisory.recommendations {
            msg.push_str(&format!("\u{2022} {}\n", rec.message));
        }
    }

    match advisory.farm_health_score {
        Some(score) => msg.push_str(&format!("\n*Farm Health Score:* {}/100", score)),
        None => msg.push_str(&format!("\n*Farm Health Score:* {}", MISSING)),
    }

    msg
}

/// Market price snapshot for one commodity.
pub fn market(price: &MarketPrice, _lang: Language) -> String {
    let mut msg = format!(
        "\u{1f4b0} *Market Prices - {}*\n\n",
        price.commodity.to_uppercase()
    );

    msg.push_str(&format!(
        "*{}:* {} {}/{}\n",
        opt_str(&price.location),
        opt_num(price.current_price),
        price.currency,
        price.unit
    ));

    let trend = price.trend.as_deref().unwrap_or("stable");
    msg.push_str(&format!("*Trend:* {} {}\n", trend_glyph(trend), trend));
    msg.push_str(&format!(
        "*7-day change:* {}%\n",
        opt_num(price.price_change_7d_percent)
    ));

    if let Some(recommendation) = &price.recommendation {
        msg.push_str(&format!(
            "\n*\u{1f4a1} Recommendation:*\n{}",
            recommendation
        ));
    }

    msg
}

/// Rewards catalog with balance and remaining daily headroom.
pub fn rewards(
    catalog: &[Reward],
    balance: u32,
    daily_remaining: u32,
    lang: Language,
) -> String {
    let mut msg = "\u{1f381} *Rewards & Points*\n\n".to_string();

    msg.push_str("*Available Rewards:*\n");
    for (index, reward) in catalog.iter().enumerate() {
        msg.push_str(&format!(
            "{}\u{fe0f}\u{20e3} {} {} - {} pts\n",
            index + 1,
            reward.emoji,
            reward.name,
            reward.cost
        ));
    }

    msg.push_str(&format!("\n*Your Points:* {}\n", balance));
    msg.push_str(&format!(
        "*Points You Can Still Earn Today:* {}\n\n",
        daily_remaining
    ));

    msg.push_str("*Commands:*\n");
    for (index, reward) in catalog.iter().enumerate() {
        msg.push_str(&format!(
            "\u{2022} Type \"redeem {}\" for {}\n",
            index + 1,
            reward.name
        ));
    }

    msg.push('\n');
    msg.push_str(text(MsgId::Signature, lang));
    msg
}

/// Successful redemption receipt.
pub fn receipt(receipt: &RedemptionReceipt, lang: Language) -> String {
    let mut msg = "\u{1f389} *Reward Redeemed Successfully!*\n\n".to_string();
    msg.push_str(&format!("*Reward:* {}\n", receipt.reward_name));
    msg.push_str(&format!("*Points Used:* {}\n", receipt.points_spent));
    msg.push_str(&format!(
        "*Remaining Points:* {}\n\n",
        receipt.remaining_balance
    ));
    msg.push_str(&format!("*Delivery:* {}\n\n", text(MsgId::DeliveryWindow, lang)));
    msg.push_str(text(MsgId::Signature, lang));
    msg
}

/// Shortfall message for a redemption the balance cannot cover.
pub fn insufficient_points(needed: u32, lang: Language) -> String {
    match lang {
        Language::En => format!("Not enough points. You need {} more points.", needed),
        Language::Kik => format!("Points ti nyingĩ. Ũbatarĩte points ingĩ {}.", needed),
    }
}

/// Simulation results for the current scenario.
pub fn simulation_results(crop: &str, simulation: &Simulation, lang: Language) -> String {
    let Some(current) = simulation.current() else {
        return text(MsgId::Apology, lang).to_string();
    };

    let mut msg = "\u{1f4ca} *Yield Simulation Results*\n\n".to_string();
    msg.push_str(&format!("*Crop:* {}\n", crop.to_uppercase()));
    msg.push_str(&format!(
        "*Predicted Yield:* {} kg/ha\n",
        opt_num(current.predicted_yield_kg_ha)
    ));
    msg.push_str(&format!(
        "*Total Yield:* {} kg\n",
        opt_num(current.total_yield_kg)
    ));
    msg.push_str(&format!(
        "*Harvest Date:* {}\n",
        current.harvest_date_estimate.as_deref().unwrap_or(MISSING)
    ));
    msg.push_str(&format!(
        "*Estimated Revenue:* ${}\n",
        opt_num(current.revenue_estimate_usd)
    ));
    msg.push_str(&format!(
        "*Net Profit:* ${}\n",
        opt_num(current.net_profit_usd)
    ));
    msg.push_str(&format!("*ROI:* {}%\n", opt_num(current.roi_percent)));

    if !simulation.recommendations.is_empty() {
        msg.push_str("\n*Recommendations:*\n");
        for rec in &simulation.recommendations {
            msg.push_str(&format!("\u{2022} {}\n", rec.action));
        }
    }

    msg
}
