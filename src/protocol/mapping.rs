use super::canonical::{CanonicalFinishReason, CanonicalRole};

// ---------------------------------------------------------------------------
// Role mappings
// ---------------------------------------------------------------------------

/// Messages dialect roles. Anything other than `user`/`assistant` is not a
/// conversational turn and is skipped by the normalizer.
#[must_use]
pub fn anthropic_role_to_canonical(s: &str) -> Option<CanonicalRole> {
    match s {
        "user" => Some(CanonicalRole::User),
        "assistant" => Some(CanonicalRole::Assistant),
        _ => None,
    }
}

/// generateContent roles: `model` is the assistant, everything else
/// (including a missing role) is the user.
#[must_use]
pub fn gemini_role_to_canonical(s: Option<&str>) -> CanonicalRole {
    match s {
        Some("model") => CanonicalRole::Assistant,
        _ => CanonicalRole::User,
    }
}

#[must_use]
pub fn canonical_role_to_backend(role: CanonicalRole) -> &'static str {
    match role {
        CanonicalRole::User => "user",
        CanonicalRole::Assistant => "assistant",
    }
}

// ---------------------------------------------------------------------------
// Finish reason mappings
// ---------------------------------------------------------------------------

#[must_use]
pub fn backend_finish_to_canonical(s: &str) -> CanonicalFinishReason {
    match s {
        "stop" => CanonicalFinishReason::Stop,
        "length" => CanonicalFinishReason::Length,
        _ => CanonicalFinishReason::Other,
    }
}

#[must_use]
pub fn canonical_finish_to_anthropic(reason: CanonicalFinishReason) -> &'static str {
    match reason {
        CanonicalFinishReason::Stop => "end_turn",
        CanonicalFinishReason::Length | CanonicalFinishReason::Other => "max_tokens",
    }
}

#[must_use]
pub fn canonical_finish_to_gemini(reason: CanonicalFinishReason) -> &'static str {
    match reason {
        CanonicalFinishReason::Stop => "STOP",
        CanonicalFinishReason::Length | CanonicalFinishReason::Other => "MAX_TOKENS",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anthropic_roles() {
        assert_eq!(
            anthropic_role_to_canonical("user"),
            Some(CanonicalRole::User)
        );
        assert_eq!(
            anthropic_role_to_canonical("assistant"),
            Some(CanonicalRole::Assistant)
        );
        assert_eq!(anthropic_role_to_canonical("system"), None);
        assert_eq!(anthropic_role_to_canonical(""), None);
    }

    #[test]
    fn test_gemini_roles() {
        assert_eq!(
            gemini_role_to_canonical(Some("model")),
            CanonicalRole::Assistant
        );
        assert_eq!(gemini_role_to_canonical(Some("user")), CanonicalRole::User);
        assert_eq!(
            gemini_role_to_canonical(Some("function")),
            CanonicalRole::User
        );
        assert_eq!(gemini_role_to_canonical(None), CanonicalRole::User);
    }

    #[test]
    fn test_finish_reason_projection() {
        assert_eq!(
            canonical_finish_to_anthropic(backend_finish_to_canonical("stop")),
            "end_turn"
        );
        assert_eq!(
            canonical_finish_to_anthropic(backend_finish_to_canonical("length")),
            "max_tokens"
        );
        assert_eq!(
            canonical_finish_to_anthropic(backend_finish_to_canonical("content_filter")),
            "max_tokens"
        );
        assert_eq!(
            canonical_finish_to_gemini(backend_finish_to_canonical("stop")),
            "STOP"
        );
        assert_eq!(
            canonical_finish_to_gemini(backend_finish_to_canonical("tool_calls")),
            "MAX_TOKENS"
        );
    }
}
