use crate::{
    dto::{ReplyRequest, ReplyResponse, SanitizedRequest},
    error::ReplyError,
    gemini::{GenerateContentResponse, TextGenerator},
};

use std::sync::Arc;

pub struct ReplyService {
    generator: Arc<dyn TextGenerator>,
}

impl ReplyService {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn generate_reply(&self, request: ReplyRequest) -> Result<ReplyResponse, ReplyError> {
        let request = request.sanitized();
        let prompt = build_prompt(&request);

        tracing::info!("Generating reply in '{}' tone", request.tone);

        let response = self.generator.generate(&prompt).await?;
        let reply = extract_reply(&response).ok_or(ReplyError::EmptyReply)?;

        tracing::info!("Generated reply of {} characters", reply.chars().count());

        Ok(ReplyResponse { reply })
    }
}

/// Renders the instruction prompt sent to the model.
///
/// The tone is stated twice, once among the requirements and once in the
/// closing instruction.
pub fn build_prompt(request: &SanitizedRequest) -> String {
    let SanitizedRequest {
        sender,
        subject,
        body,
        tone,
    } = request;

    format!(
        "You are an AI assistant that writes high-quality email replies.\n\
         \n\
         Requirements:\n\
         - Match the requested tone: `{tone}`.\n\
         - Be clear, concise, and professional.\n\
         - Preserve important details from the original email.\n\
         - Do NOT invent facts that are not in the thread.\n\
         - Return only the email body (no explanations, no quotes of the prompt).\n\
         \n\
         Sender: {sender}\n\
         Subject: {subject}\n\
         \n\
         Email thread:\n\
         {body}\n\
         \n\
         Write a reply email in a {tone} tone.\n\
         Return only the reply text that the user can send back."
    )
}

/// Joins the text parts of the first candidate. `None` when nothing is left after trimming.
pub fn extract_reply(response: &GenerateContentResponse) -> Option<String> {
    let reply = response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .map(|part| part.text.as_deref().unwrap_or(""))
                .collect::<String>()
        })
        .unwrap_or_default();

    let reply = reply.trim();
    (!reply.is_empty()).then(|| reply.to_string())
}
