//! Chat transport: frames a message and its prior turns into one prompt and
//! relays the completion, translating provider failures into user-facing text.

use tracing::{error, info};

use crate::chat::models::ChatTurn;
use crate::llm_client::prompts::TRAVEL_SYSTEM_PROMPT;
use crate::llm_client::{CompletionService, LlmError};

pub const GENERIC_FAILURE_MESSAGE: &str =
    "チャット機能で問題が発生しました。しばらく後にもう一度お試しください。";
pub const QUOTA_EXCEEDED_MESSAGE: &str = "API使用量の上限に達しました。後ほどお試しください。";
pub const RATE_LIMITED_MESSAGE: &str = "リクエストが多すぎます。少し待ってからお試しください。";
pub const MISCONFIGURED_MESSAGE: &str = "API設定に問題があります。管理者にお問い合わせください。";

/// Provider error substrings and the text shown instead. First match wins.
const PROVIDER_ERROR_MESSAGES: &[(&str, &str)] = &[
    ("quota", QUOTA_EXCEEDED_MESSAGE),
    ("rate limit", RATE_LIMITED_MESSAGE),
    ("API key", MISCONFIGURED_MESSAGE),
];

/// Flattens the system prompt, prior turns, and the new message into a single
/// prompt ending in an open `assistant: ` cue.
pub fn build_conversation_prompt(system: &str, prior_turns: &[ChatTurn], message: &str) -> String {
    let mut prompt = format!("{system}\n\n");
    for turn in prior_turns {
        prompt.push_str(turn.role.label());
        prompt.push_str(": ");
        prompt.push_str(&turn.content);
        prompt.push_str("\n\n");
    }
    prompt.push_str("user: ");
    prompt.push_str(message);
    prompt.push_str("\n\nassistant: ");
    prompt
}

/// Sends one message to the completion service. At most one call, no retry.
pub async fn send_message(
    llm: &dyn CompletionService,
    message: &str,
    prior_turns: &[ChatTurn],
) -> Result<String, LlmError> {
    let prompt = build_conversation_prompt(TRAVEL_SYSTEM_PROMPT, prior_turns, message);

    match llm.generate(&prompt).await {
        Ok(reply) => {
            info!(
                "Completion succeeded: prior_turns={}, reply_chars={}",
                prior_turns.len(),
                reply.chars().count()
            );
            Ok(reply)
        }
        Err(e) => {
            error!("Completion failed: {e}");
            Err(e)
        }
    }
}

/// Maps a provider failure to the text shown to the end user.
/// Raw provider text never leaves this function.
pub fn user_facing_message(err: &LlmError) -> &'static str {
    let provider_text = match err {
        LlmError::EmptyContent => return GENERIC_FAILURE_MESSAGE,
        other => other.to_string(),
    };

    PROVIDER_ERROR_MESSAGES
        .iter()
        .find(|(needle, _)| provider_text.contains(needle))
        .map(|(_, text)| *text)
        .unwrap_or(GENERIC_FAILURE_MESSAGE)
}
