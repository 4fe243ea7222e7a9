use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMode {
    pub name: String,
    pub description: String,
    pub personality_traits: Vec<String>,
    pub response_style: String,
    pub expertise_areas: Vec<String>,
    pub default_actions: Vec<String>,
    pub system_prompt: String,
    pub voice_settings: VoiceSettings,
    pub ui_theme: UiTheme,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub rate: i64,
    pub volume: f64,
    pub voice: String,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            rate: 160,
            volume: 0.8,
            voice: "neutral".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiTheme {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
}

impl Default for UiTheme {
    fn default() -> Self {
        Self {
            primary: "#1f2937".to_string(),
            secondary: "#374151".to_string(),
            accent: "#3b82f6".to_string(),
        }
    }
}

/// Partial update applied by `ModeRegistry::update_mode`. Only fields
/// that are `Some` are written; there is no way to express an unknown
/// field, so anything else a caller might want to change is ignored.
#[derive(Debug, Clone, Default)]
pub struct ModeUpdate {
    pub description: Option<String>,
    pub personality_traits: Option<Vec<String>>,
    pub response_style: Option<String>,
    pub expertise_areas: Option<Vec<String>>,
    pub default_actions: Option<Vec<String>>,
    pub system_prompt: Option<String>,
    pub voice_settings: Option<VoiceSettings>,
    pub ui_theme: Option<UiTheme>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModeSummary {
    pub name: String,
    pub description: String,
    pub active: bool,
    pub personality_traits: Vec<String>,
    pub expertise_areas: Vec<String>,
}

fn mode(
    name: &str,
    description: &str,
    traits: &[&str],
    style: &str,
    expertise: &[&str],
    actions: &[&str],
    prompt: &str,
    voice: VoiceSettings,
    theme: (&str, &str, &str),
) -> AgentMode {
    AgentMode {
        name: name.to_string(),
        description: description.to_string(),
        personality_traits: traits.iter().map(|s| s.to_string()).collect(),
        response_style: style.to_string(),
        expertise_areas: expertise.iter().map(|s| s.to_string()).collect(),
        default_actions: actions.iter().map(|s| s.to_string()).collect(),
        system_prompt: prompt.to_string(),
        voice_settings: voice,
        ui_theme: UiTheme {
            primary: theme.0.to_string(),
            secondary: theme.1.to_string(),
            accent: theme.2.to_string(),
        },
        active: false,
    }
}

fn voice(rate: i64, volume: f64, name: &str) -> VoiceSettings {
    VoiceSettings {
        rate,
        volume,
        voice: name.to_string(),
    }
}

/// The seven built-in personalities created on first boot.
pub fn default_modes() -> Vec<AgentMode> {
    vec![
        mode(
            "Professional",
            "Formal, business-oriented assistant focused on productivity",
            &["formal", "efficient", "detail-oriented", "professional"],
            "concise and formal",
            &["business", "productivity", "scheduling", "communication"],
            &["check_calendar", "manage_tasks", "send_emails"],
            "You are a professional AI assistant. Respond formally and focus on productivity and efficiency. Keep responses concise and business-appropriate.",
            voice(175, 0.8, "professional"),
            ("#1f2937", "#374151", "#3b82f6"),
        ),
        mode(
            "Casual",
            "Friendly, conversational assistant for daily interactions",
            &["friendly", "casual", "helpful", "conversational"],
            "warm and conversational",
            &["general_knowledge", "entertainment", "casual_chat"],
            &["chat", "provide_information", "suggest_activities"],
            "You are a friendly and casual AI assistant. Be warm, conversational, and helpful. Use a relaxed tone and feel free to be personable in your responses.",
            voice(160, 0.9, "friendly"),
            ("#10b981", "#059669", "#34d399"),
        ),
        mode(
            "Technical",
            "Developer-focused assistant with deep technical knowledge",
            &["analytical", "precise", "knowledgeable", "problem-solving"],
            "technical and detailed",
            &["programming", "debugging", "system_administration", "development_tools"],
            &["code_analysis", "debug_assistance", "git_operations", "run_tests"],
            "You are a technical AI assistant specialized in software development. Provide detailed, accurate technical information. Focus on code quality, best practices, and problem-solving.",
            voice(170, 0.7, "neutral"),
            ("#1e293b", "#334155", "#0ea5e9"),
        ),
        mode(
            "Creative",
            "Imaginative assistant for creative projects and brainstorming",
            &["creative", "imaginative", "inspiring", "artistic"],
            "inspiring and creative",
            &["writing", "design", "brainstorming", "creative_projects"],
            &["brainstorm_ideas", "creative_writing", "design_suggestions"],
            "You are a creative AI assistant. Be imaginative, inspiring, and help users explore creative possibilities. Encourage innovation and artistic expression.",
            voice(155, 0.85, "expressive"),
            ("#7c3aed", "#8b5cf6", "#a78bfa"),
        ),
        mode(
            "Research",
            "Academic and research-focused assistant for deep analysis",
            &["analytical", "thorough", "scholarly", "methodical"],
            "detailed and academic",
            &["research", "analysis", "fact_checking", "academic_writing"],
            &["research_topics", "fact_verification", "data_analysis"],
            "You are a research-focused AI assistant. Provide thorough, well-researched responses with citations when possible. Be methodical and analytical in your approach.",
            voice(165, 0.8, "scholarly"),
            ("#dc2626", "#ef4444", "#f87171"),
        ),
        mode(
            "Personal",
            "Intimate, personalized assistant that learns your preferences",
            &["empathetic", "personal", "adaptive", "caring"],
            "personal and empathetic",
            &["personal_assistance", "wellness", "lifestyle", "relationships"],
            &["personal_reminders", "mood_tracking", "lifestyle_suggestions"],
            "You are a personal AI assistant who knows the user well. Be empathetic, personal, and adaptive to their needs. Remember their preferences and provide caring, personalized assistance.",
            voice(150, 0.9, "warm"),
            ("#f59e0b", "#f97316", "#fb923c"),
        ),
        mode(
            "Gaming",
            "Gaming-focused assistant for gamers and game development",
            &["enthusiastic", "competitive", "knowledgeable", "fun"],
            "enthusiastic and gaming-oriented",
            &["gaming", "game_development", "esports", "streaming"],
            &["game_recommendations", "gaming_stats", "streaming_assistance"],
            "You are a gaming-focused AI assistant. Be enthusiastic about games, knowledgeable about gaming culture, and help with gaming-related tasks. Use gaming terminology appropriately.",
            voice(180, 0.9, "energetic"),
            ("#8b5cf6", "#a78bfa", "#c4b5fd"),
        ),
    ]
}
