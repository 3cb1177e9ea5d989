//! Interactive chat mode
//!
//! Drives the session engine over the direct channel, one REPL line per
//! inbound message. Useful for demos and for exercising the engine
//! without Twilio in the loop; the replies are byte-identical to what
//! the webhook adapter would deliver.

use std::sync::Arc;

use nu_ansi_term::{Color, Style};
use reedline::{Prompt, Reedline, Signal};
use shamba_core::{Channel, Engine};

/// Custom prompt with colored styling
struct FarmerPrompt {
    style: Style,
    phone: String,
}

impl FarmerPrompt {
    fn new(phone: &str) -> Self {
        Self {
            style: Color::Green.bold(),
            phone: phone.to_string(),
        }
    }
}

impl Prompt for FarmerPrompt {
    fn render_prompt_left(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Owned(self.style.paint(format!("{} > ", self.phone)).to_string())
    }

    fn render_prompt_right(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed("")
    }

    fn render_prompt_indicator(
        &self,
        _prompt_mode: reedline::PromptEditMode,
    ) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed("")
    }

    fn render_prompt_history_search_indicator(
        &self,
        _history_search: reedline::PromptHistorySearch,
    ) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed("")
    }
}

/// Run the chat REPL until EOF or `exit`.
pub async fn run_chat(engine: Arc<Engine>, phone: &str) -> anyhow::Result<()> {
    println!("ShambaBot chat - texting as {}", phone);
    println!("Type \"menu\" to start, \"exit\" to quit.\n");

    let mut line_editor = Reedline::create();
    let prompt = FarmerPrompt::new(phone);

    loop {
        match line_editor.read_line(&prompt)? {
            Signal::Success(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    break;
                }

                let reply = engine.handle_message(phone, line, Channel::Direct).await;
                println!("\n{}\n", reply);
            }
            Signal::CtrlC | Signal::CtrlD => break,
        }
    }

    println!("Bye!");
    Ok(())
}
