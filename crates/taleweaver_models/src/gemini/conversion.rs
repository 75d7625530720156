//! Conversion between pipeline types and REST payloads.

use crate::gemini::wire::{
    Blob, Content, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, Part, SafetySetting,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use taleweaver_core::{GenerateRequest, Input, Output, Role};
use taleweaver_error::{GeminiError, GeminiErrorKind, TaleweaverResult};
use taleweaver_interface::FinishReason;

/// Build a REST request. System messages become the system instruction.
pub fn to_wire_request(req: &GenerateRequest, safety: &[SafetySetting]) -> GenerateContentRequest {
    let mut contents = Vec::new();
    let mut system_parts = Vec::new();

    for message in &req.messages {
        let parts: Vec<Part> = message.content.iter().map(to_wire_part).collect();
        match message.role {
            Role::System => system_parts.extend(parts),
            Role::User => contents.push(Content {
                role: Some("user".to_string()),
                parts,
            }),
            Role::Model => contents.push(Content {
                role: Some("model".to_string()),
                parts,
            }),
        }
    }

    let generation_config = GenerationConfig {
        temperature: req.temperature,
        top_p: req.top_p,
        top_k: req.top_k,
        max_output_tokens: req.max_tokens,
        response_modalities: req.modalities.iter().map(ToString::to_string).collect(),
        speech_config: None,
    };

    GenerateContentRequest {
        contents,
        system_instruction: (!system_parts.is_empty()).then(|| Content {
            role: None,
            parts: system_parts,
        }),
        generation_config: Some(generation_config),
        safety_settings: safety.to_vec(),
    }
}

fn to_wire_part(input: &Input) -> Part {
    match input {
        Input::Text(text) => Part {
            text: Some(text.clone()),
            ..Default::default()
        },
        Input::Image { mime, data } => Part {
            inline_data: Some(Blob {
                mime_type: mime.clone(),
                data: STANDARD.encode(data),
            }),
            ..Default::default()
        },
    }
}

/// Outputs of the first candidate, in order, plus its finish reason.
///
/// Reasoning parts from thinking models are skipped. A blocked prompt, or a
/// candidate withheld for safety without any content, is an error.
pub fn outputs_from_response(
    resp: &GenerateContentResponse,
) -> TaleweaverResult<(Vec<Output>, Option<FinishReason>)> {
    if let Some(reason) = resp
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_ref())
    {
        return Err(GeminiError::new(GeminiErrorKind::SafetyBlocked(format!(
            "prompt blocked: {}",
            reason
        )))
        .into());
    }

    let Some(candidate) = resp.candidates.first() else {
        return Ok((Vec::new(), None));
    };
    let finish_reason = candidate
        .finish_reason
        .as_deref()
        .map(FinishReason::from_provider);

    let mut outputs = Vec::new();
    let parts = candidate
        .content
        .as_ref()
        .map(|c| c.parts.as_slice())
        .unwrap_or_default();
    for part in parts {
        if part.thought == Some(true) {
            continue;
        }
        if let Some(text) = &part.text {
            if !text.is_empty() {
                outputs.push(Output::Text(text.clone()));
            }
        }
        if let Some(blob) = &part.inline_data {
            outputs.push(decode_blob(blob)?);
        }
    }

    if outputs.is_empty() && finish_reason == Some(FinishReason::Safety) {
        return Err(GeminiError::new(GeminiErrorKind::SafetyBlocked(format!(
            "candidate withheld: {}",
            candidate.finish_reason.as_deref().unwrap_or("SAFETY")
        )))
        .into());
    }

    Ok((outputs, finish_reason))
}

fn decode_blob(blob: &Blob) -> TaleweaverResult<Output> {
    let data = STANDARD
        .decode(blob.data.as_bytes())
        .map_err(|e| GeminiError::new(GeminiErrorKind::Base64Decode(e.to_string())))?;
    let mime = blob.mime_type.clone();
    Ok(if mime.starts_with("audio/") {
        Output::Audio { mime, data }
    } else {
        Output::Image { mime, data }
    })
}

/// Error for a non-2xx status, using the API's message when the body has one.
///
/// The canonical status (e.g. `RESOURCE_EXHAUSTED`) is kept in the message.
#[track_caller]
pub fn http_error(status_code: u16, body: &str) -> GeminiError {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.status.is_empty() => {
            format!("{}: {}", envelope.error.status, envelope.error.message)
        }
        Ok(envelope) => envelope.error.message,
        Err(_) => body.chars().take(500).collect(),
    };
    GeminiError::new(GeminiErrorKind::HttpError {
        status_code,
        message,
    })
}

/// Sample rate from an `audio/L16;codec=pcm;rate=24000` MIME type.
///
/// # Examples
///
/// ```
/// use taleweaver_models::gemini::pcm_rate;
///
/// assert_eq!(pcm_rate("audio/L16;codec=pcm;rate=24000"), Some(24000));
/// assert_eq!(pcm_rate("audio/wav"), None);
/// ```
pub fn pcm_rate(mime: &str) -> Option<u32> {
    mime.split(';')
        .filter_map(|param| param.trim().strip_prefix("rate="))
        .find_map(|rate| rate.parse().ok())
}
