use crate::models::AgentMode;

/// Informal phrases rewritten when the formal transformation applies.
const FORMAL_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("yeah", "yes"),
    ("ok", "very well"),
    ("sure", "certainly"),
    ("nope", "no"),
    ("gonna", "going to"),
    ("wanna", "want to"),
];

/// Trait priority for picking the single transformation to apply.
const TRAIT_PRIORITY: &[&str] = &["formal", "casual", "technical", "creative"];

/// Adjust a response to the active mode's tone. At most one
/// transformation runs, chosen by the first trait in the priority list
/// the mode carries; no active mode leaves the response untouched.
pub fn personalize(mode: Option<&AgentMode>, response: &str) -> String {
    let Some(mode) = mode else {
        return response.to_string();
    };

    let selected = TRAIT_PRIORITY
        .iter()
        .find(|t| mode.personality_traits.iter().any(|have| have == *t));

    match selected {
        Some(&"formal") => formalize(response),
        Some(&"casual") => casualize(response),
        // technical and creative are pass-through for now
        _ => response.to_string(),
    }
}

fn formalize(response: &str) -> String {
    let mut formal = response.to_string();
    for (informal, replacement) in FORMAL_SUBSTITUTIONS {
        formal = formal.replace(informal, replacement);
    }
    formal
}

fn casualize(response: &str) -> String {
    if response.ends_with('!') || response.ends_with('?') || response.ends_with('.') {
        response.to_string()
    } else {
        format!("{}!", response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_modes;

    fn mode_named(name: &str) -> AgentMode {
        default_modes()
            .into_iter()
            .find(|m| m.name == name)
            .unwrap()
    }

    #[test]
    fn no_mode_passes_through() {
        assert_eq!(personalize(None, "yeah sure"), "yeah sure");
    }

    #[test]
    fn formal_mode_substitutes_informal_phrases() {
        let professional = mode_named("Professional");
        assert_eq!(
            personalize(Some(&professional), "yeah, gonna do it"),
            "yes, going to do it"
        );
    }

    #[test]
    fn casual_mode_appends_missing_terminal_punctuation() {
        let casual = mode_named("Casual");
        assert_eq!(personalize(Some(&casual), "sounds good"), "sounds good!");
        assert_eq!(personalize(Some(&casual), "sounds good."), "sounds good.");
    }

    #[test]
    fn technical_mode_is_pass_through() {
        let technical = mode_named("Technical");
        assert_eq!(personalize(Some(&technical), "yeah ok"), "yeah ok");
    }

    #[test]
    fn first_matching_trait_wins() {
        let mut hybrid = mode_named("Casual");
        hybrid.personality_traits = vec!["casual".to_string(), "formal".to_string()];
        // "formal" precedes "casual" in the priority list regardless of
        // the order the mode declares its traits in.
        assert_eq!(personalize(Some(&hybrid), "yeah"), "yes");
    }
}
