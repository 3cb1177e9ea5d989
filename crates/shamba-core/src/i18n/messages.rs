//! Language resource table
//!
//! One entry per fixed string, per language. Adding a language means
//! adding match arms here, not touching the formatters.

use crate::farmer::Language;

/// Identifier for a fixed outbound string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsgId {
    /// Data-unavailable apology, rendered on any intel failure
    Apology,
    /// Prompt shown when entering the simulation flow
    SimulationPrompt,
    /// Corrective message for malformed simulate arguments
    SimulationFormatError,
    /// Confirmation after a language toggle, in the new language
    LanguageSwitched,
    /// Redeem command without a reward number
    RedeemSpecify,
    /// Redeem command with an out-of-range reward number
    InvalidReward,
    /// Fixed delivery window line on a redemption receipt
    DeliveryWindow,
    /// Header of the main menu
    MenuTitle,
    /// Footer signature appended to menu and rewards messages
    Signature,
}

/// Look up a fixed string for a language.
pub fn text(id: MsgId, lang: Language) -> &'static str {
    match (id, lang) {
        (MsgId::Apology, Language::En) => {
            "\u{274c} Unable to fetch data right now. Please try again later."
        }
        (MsgId::Apology, Language::Kik) => {
            "\u{274c} Tũtinahota kuona data rĩu. Geria rĩngĩ thutha wa kahinda."
        }

        (MsgId::SimulationPrompt, Language::En) => {
            "\u{1f33e} *Yield Simulation*\n\n\
             To simulate crop yield, I need some information:\n\n\
             1\u{fe0f}\u{20e3} What crop? (maize, beans, tomatoes, coffee)\n\
             2\u{fe0f}\u{20e3} Planting date?\n\
             3\u{fe0f}\u{20e3} Farm size in hectares?\n\n\
             Reply with: \"simulate maize 2024-03-15 2.0\""
        }
        (MsgId::SimulationPrompt, Language::Kik) => {
            "\u{1f33e} *Gwĩciiria Magetha*\n\n\
             Nĩngwenda ũhoro ũyũ:\n\n\
             1\u{fe0f}\u{20e3} Mbegũ ĩrĩkũ? (maize, beans, tomatoes, coffee)\n\
             2\u{fe0f}\u{20e3} Mũthenya wa kũhaanda?\n\
             3\u{fe0f}\u{20e3} Ũnene wa mũgũnda (hectares)?\n\n\
             Cookia ũguo: \"simulate maize 2024-03-15 2.0\""
        }

        (MsgId::SimulationFormatError, Language::En) => {
            "\u{274c} Invalid simulation format. Please use: \"simulate crop date size\"\n\
             Example: \"simulate maize 2024-03-15 2.0\""
        }
        (MsgId::SimulationFormatError, Language::Kik) => {
            "\u{274c} Mũhaano ti mwega. Hũthĩra: \"simulate crop date size\"\n\
             Kĩonereria: \"simulate maize 2024-03-15 2.0\""
        }

        (MsgId::LanguageSwitched, Language::En) => {
            "Language switched to English. Type \"menu\" to see the main menu."
        }
        (MsgId::LanguageSwitched, Language::Kik) => {
            "Rũthiomi rũgarũrĩtwo gũtuĩka Gĩkũyũ. Andĩka \"menu\" wone mũbango."
        }

        (MsgId::RedeemSpecify, Language::En) => "Please specify reward number (1-3)",
        (MsgId::RedeemSpecify, Language::Kik) => "Taga namba ya kĩheo (1-3)",

        (MsgId::InvalidReward, Language::En) => "Invalid reward number",
        (MsgId::InvalidReward, Language::Kik) => "Namba ya kĩheo ti njega",

        (MsgId::DeliveryWindow, Language::En) => "3-5 business days",
        (MsgId::DeliveryWindow, Language::Kik) => "Mĩthenya 3-5 ya wĩra",

        (MsgId::MenuTitle, Language::En) => {
            "\u{1f331} *ShambaBot - Sustainable Farming Assistant*"
        }
        (MsgId::MenuTitle, Language::Kik) => {
            "\u{1f331} *ShambaBot - Mũteithia wa Ũrĩmi*"
        }

        (MsgId::Signature, Language::En) => "*ShambaBot Team* \u{1f331}",
        (MsgId::Signature, Language::Kik) => "*Kĩama kĩa ShambaBot* \u{1f331}",
    }
}
