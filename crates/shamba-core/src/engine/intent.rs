//! Free-text command classification
//!
//! The matching the bots do is a hand-rolled parser, so it is modeled as
//! an ordered rule list: numeric shortcuts, then keyword substrings, then
//! state-aware continuation, then the unrecognized fallback. The order is
//! a contract; a bare crop name typed mid-simulation must reach the
//! continuation rule instead of falling out as unrecognized.

use std::sync::OnceLock;

use regex::Regex;

use crate::session::MenuState;

/// Classified meaning of one inbound message
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Render the main menu
    ShowMenu,
    /// Weather forecast lookup
    GetWeather,
    /// Farming advisory lookup
    GetAdvisory,
    /// Market price lookup for the farmer's default crop
    GetMarketPrice,
    /// Enter the simulation flow (prompt for arguments)
    StartSimulation,
    /// Simulation arguments; `raw` is parsed at execution time so a
    /// malformed submit can be answered without changing state
    SubmitSimulation { raw: String },
    /// Render the rewards catalog and balance
    ShowRewards,
    /// Flip the conversation language
    ToggleLanguage,
    /// Redeem a reward; `index` is absent when no number was given
    Redeem { index: Option<usize> },
    /// Nothing matched
    Unrecognized,
}

fn redeem_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"redeem\s*(\d+)").unwrap())
}

/// Classify raw text against the current session state.
pub fn classify(raw_text: &str, state: MenuState) -> Intent {
    let text = raw_text.trim().to_lowercase();
    if text.is_empty() {
        return Intent::Unrecognized;
    }

    // numeric shortcuts come first
    match text.as_str() {
        "1" => return Intent::GetWeather,
        "2" => return Intent::GetAdvisory,
        "3" => return Intent::GetMarketPrice,
        "4" => return Intent::ShowRewards,
        "5" => return Intent::ToggleLanguage,
        "0" => return Intent::ShowMenu,
        _ => {}
    }

    // keyword substrings, in the bots' historical branch order
    if text.contains("weather") || text.contains("forecast") {
        return Intent::GetWeather;
    }
    if text.contains("advice") || text.contains("advisory") {
        return Intent::GetAdvisory;
    }
    if text.contains("price") || text.contains("market") {
        return Intent::GetMarketPrice;
    }
    if text.starts_with("simulate ") {
        return Intent::SubmitSimulation { raw: text };
    }
    if text.contains("simulate") || text.contains("yield") {
        return Intent::StartSimulation;
    }
    if text.contains("rewards") || text.contains("points") {
        return Intent::ShowRewards;
    }
    if text.contains("language") {
        return Intent::ToggleLanguage;
    }
    if text.contains("redeem") {
        let index = redeem_regex()
            .captures(&text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok());
        return Intent::Redeem { index };
    }
    if text.contains("help") || text == "hi" || text == "hello" || text == "menu" {
        return Intent::ShowMenu;
    }

    // mid-flow continuation: anything else typed while the engine is
    // waiting for simulation arguments is a submit attempt
    if state == MenuState::SimulationInput {
        return Intent::SubmitSimulation { raw: text };
    }

    Intent::Unrecognized
}

/// Parse `simulate <crop> <date> <size_ha>`.
///
/// Requires at least four whitespace tokens with a decimal farm size;
/// anything else is malformed and the caller renders the format error
/// without leaving the simulation flow.
pub fn parse_simulation(raw: &str) -> Option<(String, String, f64)> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.len() < 4 || tokens[0] != "simulate" {
        return None;
    }
    let size_ha: f64 = tokens[3].parse().ok()?;
    if size_ha <= 0.0 {
        return None;
    }
    Some((tokens[1].to_string(), tokens[2].to_string(), size_ha))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_shortcuts() {
        assert_eq!(classify("1", MenuState::MainMenu), Intent::GetWeather);
        assert_eq!(classify("2", MenuState::MainMenu), Intent::GetAdvisory);
        assert_eq!(classify("3", MenuState::MainMenu), Intent::GetMarketPrice);
        assert_eq!(classify("4", MenuState::MainMenu), Intent::ShowRewards);
        assert_eq!(classify("5", MenuState::MainMenu), Intent::ToggleLanguage);
        assert_eq!(classify("0", MenuState::MainMenu), Intent::ShowMenu);
    }

    #[test]
    fn test_keywords_are_case_insensitive_substrings() {
        assert_eq!(
            classify("What's the WEATHER like?", MenuState::MainMenu),
            Intent::GetWeather
        );
        assert_eq!(
            classify("any advice today", MenuState::MainMenu),
            Intent::GetAdvisory
        );
        assert_eq!(
            classify("market prices please", MenuState::MainMenu),
            Intent::GetMarketPrice
        );
        assert_eq!(
            classify("my points?", MenuState::MainMenu),
            Intent::ShowRewards
        );
    }

    #[test]
    fn test_greetings_show_menu() {
        assert_eq!(classify("hi", MenuState::MainMenu), Intent::ShowMenu);
        assert_eq!(classify("hello", MenuState::MainMenu), Intent::ShowMenu);
        assert_eq!(classify("help", MenuState::MainMenu), Intent::ShowMenu);
        assert_eq!(classify("menu", MenuState::MainMenu), Intent::ShowMenu);
    }

    #[test]
    fn test_numeric_beats_keyword() {
        // "1" must hit the shortcut table, not fall through to keywords
        assert_eq!(classify(" 1 ", MenuState::SimulationInput), Intent::GetWeather);
    }

    #[test]
    fn test_bare_simulate_starts_flow() {
        assert_eq!(
            classify("simulate", MenuState::MainMenu),
            Intent::StartSimulation
        );
        assert_eq!(
            classify("yield simulation", MenuState::MainMenu),
            Intent::StartSimulation
        );
    }

    #[test]
    fn test_simulate_with_args_is_a_submit() {
        let intent = classify("simulate maize 2024-03-15 2.0", MenuState::MainMenu);
        assert_eq!(
            intent,
            Intent::SubmitSimulation {
                raw: "simulate maize 2024-03-15 2.0".to_string()
            }
        );
    }

    #[test]
    fn test_redeem_with_and_without_number() {
        assert_eq!(
            classify("redeem 2", MenuState::MainMenu),
            Intent::Redeem { index: Some(2) }
        );
        assert_eq!(
            classify("redeem", MenuState::MainMenu),
            Intent::Redeem { index: None }
        );
    }

    #[test]
    fn test_mid_flow_text_continues_simulation() {
        assert_eq!(
            classify("maize 2024-03-15 2.0", MenuState::SimulationInput),
            Intent::SubmitSimulation {
                raw: "maize 2024-03-15 2.0".to_string()
            }
        );
        // same text from the main menu is unrecognized
        assert_eq!(
            classify("maize 2024-03-15 2.0", MenuState::MainMenu),
            Intent::Unrecognized
        );
    }

    #[test]
    fn test_menu_beats_continuation_mid_flow() {
        assert_eq!(classify("menu", MenuState::SimulationInput), Intent::ShowMenu);
        assert_eq!(classify("0", MenuState::SimulationInput), Intent::ShowMenu);
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(classify("banana", MenuState::MainMenu), Intent::Unrecognized);
        assert_eq!(classify("", MenuState::MainMenu), Intent::Unrecognized);
    }

    #[test]
    fn test_parse_simulation_happy_path() {
        let (crop, date, size) = parse_simulation("simulate maize 2024-03-15 2.0").unwrap();
        assert_eq!(crop, "maize");
        assert_eq!(date, "2024-03-15");
        assert_eq!(size, 2.0);
    }

    #[test]
    fn test_parse_simulation_rejects_malformed() {
        assert!(parse_simulation("simulate maize").is_none());
        assert!(parse_simulation("simulate maize 2024-03-15 large").is_none());
        assert!(parse_simulation("simulate maize 2024-03-15 0").is_none());
        assert!(parse_simulation("maize 2024-03-15 2.0").is_none());
    }
}
