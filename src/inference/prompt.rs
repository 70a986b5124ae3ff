//! Qwen2 chat template
//!
//! ChatML-style turns: `<|im_start|>{role}\n{content}<|im_end|>\n`.

use crate::types::message::Role;

pub const IM_START: &str = "<|im_start|>";
pub const IM_END: &str = "<|im_end|>";

/// Wrap a single user message and open the assistant turn
pub fn build_chat_prompt(message: &str) -> String {
    let mut prompt = String::with_capacity(message.len() + 64);
    push_turn(&mut prompt, Role::User, message);
    prompt.push_str(IM_START);
    prompt.push_str(Role::Assistant.as_str());
    prompt.push('\n');
    prompt
}

fn push_turn(prompt: &mut String, role: Role, content: &str) {
    prompt.push_str(IM_START);
    prompt.push_str(role.as_str());
    prompt.push('\n');
    prompt.push_str(content);
    prompt.push_str(IM_END);
    prompt.push('\n');
}

/// Turn delimiters that end the assistant's reply
pub fn stop_sequences() -> Vec<String> {
    vec![IM_END.to_string(), IM_START.to_string()]
}
