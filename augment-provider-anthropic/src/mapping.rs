//! Request/response mapping between augment-core and the Anthropic Messages API format.
//!
//! Reference: <https://docs.anthropic.com/en/api/messages>

use augment_core::{
    ContentBlock, ContentItem, Message, ProviderError, ProviderRequest, ProviderResponse, Role,
    StopReason, TokenUsage, ToolSchema,
};
use serde_json::{Value, json};

/// Output token limit used when the request sets none.
const DEFAULT_MAX_TOKENS: u32 = 4096;

// ─── Request mapping ─────────────────────────────────────────────────────────

/// Convert a [`ProviderRequest`] into the Anthropic Messages API JSON body.
///
/// `metadata` entries are merged last and override computed fields.
#[must_use]
pub fn to_api_request(req: &ProviderRequest, default_model: &str) -> Value {
    let model = req
        .model
        .as_deref()
        .filter(|m| !m.is_empty())
        .unwrap_or(default_model);

    let mut body = json!({
        "model": model,
        "messages": req.messages.iter().map(map_message).collect::<Vec<_>>(),
        "max_tokens": req.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
    });

    if let Some(system) = req.system.as_deref().filter(|s| !s.is_empty()) {
        body["system"] = Value::from(system);
    }

    if !req.stop_sequences.is_empty() {
        body["stop_sequences"] = json!(req.stop_sequences);
    }

    if !req.tools.is_empty() {
        body["tools"] = Value::Array(req.tools.iter().map(map_tool_schema).collect());
        if !req.parallel_tool_calls {
            body["tool_choice"] = json!({ "type": "auto", "disable_parallel_tool_use": true });
        }
    }

    if let Some(metadata) = &req.metadata
        && let Value::Object(body_map) = &mut body
    {
        for (k, v) in metadata {
            body_map.insert(k.clone(), v.clone());
        }
    }

    body
}

fn map_message(msg: &Message) -> Value {
    json!({
        "role": msg.role.as_str(),
        "content": msg.content.iter().map(map_content_block).collect::<Vec<_>>(),
    })
}

/// Map a single [`ContentBlock`] to its Anthropic JSON representation.
pub(crate) fn map_content_block(block: &ContentBlock) -> Value {
    match block {
        ContentBlock::Text { text } => json!({ "type": "text", "text": text }),
        ContentBlock::ToolUse { id, name, input } => json!({
            "type": "tool_use",
            "id": id,
            "name": name,
            "input": input,
        }),
        ContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => json!({
            "type": "tool_result",
            "tool_use_id": tool_use_id,
            "content": content.iter().map(map_content_item).collect::<Vec<_>>(),
            "is_error": is_error,
        }),
    }
}

/// Tool results accept text and image items; JSON goes over as text.
fn map_content_item(item: &ContentItem) -> Value {
    match item {
        ContentItem::Text { text } => json!({ "type": "text", "text": text }),
        ContentItem::Json { value } => json!({ "type": "text", "text": value.to_string() }),
        ContentItem::Image { media_type, data } => json!({
            "type": "image",
            "source": { "type": "base64", "media_type": media_type, "data": data },
        }),
    }
}

fn map_tool_schema(tool: &ToolSchema) -> Value {
    json!({
        "name": tool.name,
        "description": tool.description,
        "input_schema": tool.input_schema,
    })
}

/// Whether Anthropic accepts `name` as a tool name (`^[a-zA-Z0-9_-]{1,64}$`).
pub(crate) fn is_valid_tool_name(name: &str) -> bool {
    (1..=64).contains(&name.len())
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

// ─── Response mapping ─────────────────────────────────────────────────────────

/// Parse an Anthropic Messages API response into a [`ProviderResponse`].
///
/// Content block types other than `text` and `tool_use` (thinking, server
/// tool blocks) are skipped.
///
/// # Errors
///
/// Returns [`ProviderError::InvalidResponse`] if required fields are missing or malformed.
pub fn from_api_response(body: &Value) -> Result<ProviderResponse, ProviderError> {
    let id = body["id"]
        .as_str()
        .ok_or_else(|| ProviderError::InvalidResponse("missing 'id' in response".into()))?
        .to_string();

    let model = body["model"]
        .as_str()
        .ok_or_else(|| ProviderError::InvalidResponse("missing 'model' in response".into()))?
        .to_string();

    let content_arr = body["content"].as_array().ok_or_else(|| {
        ProviderError::InvalidResponse("missing 'content' array in response".into())
    })?;

    let mut content = Vec::with_capacity(content_arr.len());
    for block in content_arr {
        if let Some(block) = parse_content_block(block)? {
            content.push(block);
        }
    }

    let stop_reason = body["stop_reason"]
        .as_str()
        .map(parse_stop_reason)
        .unwrap_or(StopReason::EndTurn);

    Ok(ProviderResponse {
        id,
        model,
        role: Role::Assistant,
        content,
        stop_reason,
        usage: parse_usage(&body["usage"]),
    })
}

fn parse_content_block(block: &Value) -> Result<Option<ContentBlock>, ProviderError> {
    let block_type = block["type"]
        .as_str()
        .ok_or_else(|| ProviderError::InvalidResponse("content block missing 'type'".into()))?;

    match block_type {
        "text" => {
            let text = block["text"]
                .as_str()
                .ok_or_else(|| ProviderError::InvalidResponse("text block missing 'text'".into()))?;
            Ok(Some(ContentBlock::text(text)))
        }
        "tool_use" => {
            let id = block["id"].as_str().ok_or_else(|| {
                ProviderError::InvalidResponse("tool_use block missing 'id'".into())
            })?;
            let name = block["name"].as_str().ok_or_else(|| {
                ProviderError::InvalidResponse("tool_use block missing 'name'".into())
            })?;
            let input = match &block["input"] {
                Value::Null => json!({}),
                other => other.clone(),
            };
            Ok(Some(ContentBlock::ToolUse {
                id: id.to_string(),
                name: name.to_string(),
                input,
            }))
        }
        other => {
            tracing::debug!(block_type = other, "augment.anthropic.skipped_block");
            Ok(None)
        }
    }
}

fn parse_usage(usage: &Value) -> TokenUsage {
    TokenUsage {
        input_tokens: usage["input_tokens"].as_u64().unwrap_or(0),
        output_tokens: usage["output_tokens"].as_u64().unwrap_or(0),
    }
}

/// Map an Anthropic `stop_reason` string to a [`StopReason`].
///
/// Values this crate does not know (e.g. `pause_turn`, `refusal`) are kept
/// as [`StopReason::Other`].
pub fn parse_stop_reason(reason: &str) -> StopReason {
    StopReason::parse(reason)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
