use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::database::now_stored;
use crate::error::{AssistantError, Result};
use crate::models::{default_modes, AgentMode, ModeSummary, ModeUpdate, UiTheme, VoiceSettings};

/// The mode every fresh registry activates and the one re-activated
/// when the current mode is removed. It cannot itself be removed.
pub const FALLBACK_MODE: &str = "Professional";

/// Static context-keyword table used by `suggest_modes`. Iteration
/// order is the tie-break, so this stays a slice rather than a map.
const MODE_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Professional",
        &["work", "business", "meeting", "email", "formal", "office"],
    ),
    (
        "Technical",
        &["code", "programming", "debug", "error", "development", "git"],
    ),
    (
        "Creative",
        &["design", "art", "creative", "brainstorm", "write", "idea"],
    ),
    (
        "Research",
        &["research", "analyze", "study", "academic", "paper", "data"],
    ),
    ("Gaming", &["game", "gaming", "play", "stream", "esports"]),
    (
        "Personal",
        &["personal", "mood", "feeling", "wellness", "life", "relationship"],
    ),
];

/// On-disk layout of the registry file.
#[derive(Serialize, Deserialize)]
struct RegistryDocument {
    modes: Vec<AgentMode>,
    current_mode: Option<String>,
    last_updated: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModeAnalytics {
    pub total_modes: usize,
    pub current_mode: Option<String>,
    pub available_modes: Vec<String>,
    pub last_updated: String,
}

/// Registry of assistant personalities. Every mutation writes the full
/// registry back to disk; persistence is best effort and never blocks
/// an in-memory state change.
pub struct ModeRegistry {
    registry_path: PathBuf,
    modes: Vec<AgentMode>,
    current: Option<String>,
}

impl ModeRegistry {
    /// Load from `registry_path`, falling back to the built-in defaults
    /// when the file is missing or unreadable. Missing defaults are
    /// re-added so a registry can never lose its built-in personalities.
    pub fn new(registry_path: impl Into<PathBuf>) -> Self {
        let registry_path = registry_path.into();
        let mut registry = Self {
            registry_path,
            modes: Vec::new(),
            current: None,
        };
        registry.load();

        for default in default_modes() {
            if registry.find(&default.name).is_none() {
                registry.modes.push(default);
            }
        }
        if registry.current.is_none() {
            let _ = registry.activate(FALLBACK_MODE);
        }
        registry.save();
        registry
    }

    fn load(&mut self) {
        if !self.registry_path.exists() {
            return;
        }
        let loaded = std::fs::read_to_string(&self.registry_path)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                serde_json::from_str::<RegistryDocument>(&content).map_err(|e| e.to_string())
            });
        match loaded {
            Ok(doc) => {
                self.modes = doc.modes;
                self.current = doc.current_mode;
            }
            Err(e) => {
                log::warn!(
                    "failed to load mode registry from {}: {}; reinitializing defaults",
                    self.registry_path.display(),
                    e
                );
            }
        }
    }

    /// Write-through persistence. Failures leave in-memory state intact.
    fn save(&self) {
        let doc = RegistryDocument {
            modes: self.modes.clone(),
            current_mode: self.current.clone(),
            last_updated: now_stored(),
        };
        let result = serde_json::to_string_pretty(&doc)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                if let Some(parent) = self.registry_path.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
                }
                std::fs::write(&self.registry_path, content).map_err(|e| e.to_string())
            });
        if let Err(e) = result {
            log::error!(
                "failed to save mode registry to {}: {}",
                self.registry_path.display(),
                e
            );
        }
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.modes.iter().position(|m| m.name == name)
    }

    fn activate(&mut self, name: &str) -> Result<()> {
        let idx = self
            .find(name)
            .ok_or_else(|| AssistantError::not_found("Mode", name))?;
        for mode in &mut self.modes {
            mode.active = false;
        }
        self.modes[idx].active = true;
        self.current = Some(name.to_string());
        Ok(())
    }

    pub fn get_active_mode(&self) -> Option<&AgentMode> {
        let current = self.current.as_deref()?;
        self.modes.iter().find(|m| m.name == current)
    }

    pub fn set_active_mode(&mut self, name: &str) -> Result<String> {
        self.activate(name)?;
        self.save();
        Ok(format!("Switched to {} mode", name))
    }

    /// Add or replace a mode under its name. The incoming `active` flag
    /// is ignored; only the registry decides which mode is active.
    pub fn add_mode(&mut self, mut mode: AgentMode) -> String {
        let name = mode.name.clone();
        mode.active = self.current.as_deref() == Some(name.as_str());
        match self.find(&name) {
            Some(idx) => self.modes[idx] = mode,
            None => self.modes.push(mode),
        }
        self.save();
        format!("Added agent mode: {}", name)
    }

    /// Remove a mode. The fallback mode is protected, and removing the
    /// active mode re-activates the fallback first.
    pub fn remove_mode(&mut self, name: &str) -> Result<String> {
        if name == FALLBACK_MODE {
            return Err(AssistantError::ProtectedMode(name.to_string()));
        }
        let idx = self
            .find(name)
            .ok_or_else(|| AssistantError::not_found("Mode", name))?;

        if self.current.as_deref() == Some(name) {
            self.activate(FALLBACK_MODE)?;
        }
        self.modes.remove(idx);
        self.save();
        Ok(format!("Removed agent mode: {}", name))
    }

    /// Clone `base_name` under a new name, inactive.
    pub fn create_custom_mode(
        &mut self,
        name: &str,
        description: &str,
        base_name: &str,
    ) -> Result<String> {
        let base_idx = self
            .find(base_name)
            .ok_or_else(|| AssistantError::not_found("Base mode", base_name))?;
        if self.find(name).is_some() {
            return Err(AssistantError::AlreadyExists(name.to_string()));
        }

        let mut custom = self.modes[base_idx].clone();
        custom.name = name.to_string();
        custom.description = description.to_string();
        custom.active = false;
        self.modes.push(custom);
        self.save();
        Ok(format!(
            "Created custom mode '{}' based on '{}'",
            name, base_name
        ))
    }

    /// Apply the `Some` fields of `updates` to an existing mode.
    pub fn update_mode(&mut self, name: &str, updates: ModeUpdate) -> Result<String> {
        let idx = self
            .find(name)
            .ok_or_else(|| AssistantError::not_found("Mode", name))?;
        let mode = &mut self.modes[idx];

        if let Some(description) = updates.description {
            mode.description = description;
        }
        if let Some(traits) = updates.personality_traits {
            mode.personality_traits = traits;
        }
        if let Some(style) = updates.response_style {
            mode.response_style = style;
        }
        if let Some(areas) = updates.expertise_areas {
            mode.expertise_areas = areas;
        }
        if let Some(actions) = updates.default_actions {
            mode.default_actions = actions;
        }
        if let Some(prompt) = updates.system_prompt {
            mode.system_prompt = prompt;
        }
        if let Some(voice) = updates.voice_settings {
            mode.voice_settings = voice;
        }
        if let Some(theme) = updates.ui_theme {
            mode.ui_theme = theme;
        }

        self.save();
        Ok(format!("Updated mode: {}", name))
    }

    /// At most three mode names whose keyword table matches the
    /// context, in table order. Falls back to the current mode.
    pub fn suggest_modes(&self, context: &str) -> Vec<String> {
        let context = context.to_lowercase();
        let mut suggestions = Vec::new();

        for (mode_name, keywords) in MODE_KEYWORDS {
            if self.find(mode_name).is_none() {
                continue;
            }
            if keywords.iter().any(|kw| context.contains(kw)) {
                suggestions.push(mode_name.to_string());
            }
        }

        if suggestions.is_empty() {
            if let Some(current) = &self.current {
                suggestions.push(current.clone());
            }
        }
        suggestions.truncate(3);
        suggestions
    }

    pub fn system_prompt(&self) -> String {
        self.get_active_mode()
            .map(|m| m.system_prompt.clone())
            .unwrap_or_else(|| "You are a helpful AI assistant.".to_string())
    }

    pub fn voice_settings(&self) -> VoiceSettings {
        self.get_active_mode()
            .map(|m| m.voice_settings.clone())
            .unwrap_or_default()
    }

    pub fn ui_theme(&self) -> UiTheme {
        self.get_active_mode()
            .map(|m| m.ui_theme.clone())
            .unwrap_or_default()
    }

    pub fn default_actions(&self) -> Vec<String> {
        self.get_active_mode()
            .map(|m| m.default_actions.clone())
            .unwrap_or_else(|| vec!["chat".to_string(), "provide_information".to_string()])
    }

    pub fn list_modes(&self) -> Vec<ModeSummary> {
        self.modes
            .iter()
            .map(|m| ModeSummary {
                name: m.name.clone(),
                description: m.description.clone(),
                active: self.current.as_deref() == Some(m.name.as_str()),
                personality_traits: m.personality_traits.clone(),
                expertise_areas: m.expertise_areas.clone(),
            })
            .collect()
    }

    pub fn mode_analytics(&self) -> ModeAnalytics {
        ModeAnalytics {
            total_modes: self.modes.len(),
            current_mode: self.current.clone(),
            available_modes: self.modes.iter().map(|m| m.name.clone()).collect(),
            last_updated: now_stored(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_registry(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "artifix-modes-{}-{}.json",
            tag,
            std::process::id()
        ))
    }

    fn fresh(tag: &str) -> (ModeRegistry, PathBuf) {
        let path = temp_registry(tag);
        let _ = std::fs::remove_file(&path);
        (ModeRegistry::new(&path), path)
    }

    #[test]
    fn fresh_registry_has_seven_defaults_with_professional_active() {
        let (registry, path) = fresh("defaults");
        assert_eq!(registry.list_modes().len(), 7);
        assert_eq!(registry.get_active_mode().unwrap().name, "Professional");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn at_most_one_mode_is_active() {
        let (mut registry, path) = fresh("exclusive");
        for name in ["Casual", "Gaming", "Technical", "Casual"] {
            registry.set_active_mode(name).unwrap();
            let active = registry.list_modes().iter().filter(|m| m.active).count();
            assert_eq!(active, 1);
            assert_eq!(registry.get_active_mode().unwrap().name, name);
        }
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn set_active_mode_unknown_is_not_found() {
        let (mut registry, path) = fresh("unknown");
        let err = registry.set_active_mode("Imaginary").unwrap_err();
        assert!(matches!(err, AssistantError::NotFound { .. }));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn registry_round_trips_through_disk() {
        let path = temp_registry("roundtrip");
        let _ = std::fs::remove_file(&path);
        {
            let mut registry = ModeRegistry::new(&path);
            registry
                .create_custom_mode("Night Owl", "Late-night focus", "Technical")
                .unwrap();
            registry.set_active_mode("Night Owl").unwrap();
        }
        let reloaded = ModeRegistry::new(&path);
        assert_eq!(reloaded.list_modes().len(), 8);
        assert_eq!(reloaded.get_active_mode().unwrap().name, "Night Owl");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn removing_active_mode_falls_back_to_professional() {
        let (mut registry, path) = fresh("fallback");
        registry
            .create_custom_mode("Temp", "short-lived", "Casual")
            .unwrap();
        registry.set_active_mode("Temp").unwrap();
        registry.remove_mode("Temp").unwrap();
        assert_eq!(registry.get_active_mode().unwrap().name, "Professional");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn professional_cannot_be_removed() {
        let (mut registry, path) = fresh("protected");
        let err = registry.remove_mode("Professional").unwrap_err();
        assert!(matches!(err, AssistantError::ProtectedMode(_)));
        assert!(registry.find("Professional").is_some());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn add_mode_ignores_incoming_active_flag() {
        let (mut registry, path) = fresh("add-active");
        let rogue = AgentMode {
            name: "Rogue".to_string(),
            description: "claims to be active".to_string(),
            personality_traits: vec!["bold".to_string()],
            response_style: "blunt".to_string(),
            expertise_areas: Vec::new(),
            default_actions: Vec::new(),
            system_prompt: "You are blunt.".to_string(),
            voice_settings: VoiceSettings::default(),
            ui_theme: UiTheme::default(),
            active: true,
        };
        registry.add_mode(rogue);

        let flagged = registry.modes.iter().filter(|m| m.active).count();
        assert_eq!(flagged, 1);
        assert_eq!(registry.get_active_mode().unwrap().name, "Professional");

        // Replacing the current mode keeps it active.
        let mut replacement = registry.modes[registry.find("Professional").unwrap()].clone();
        replacement.active = false;
        registry.add_mode(replacement);
        let flagged = registry.modes.iter().filter(|m| m.active).count();
        assert_eq!(flagged, 1);
        assert_eq!(registry.get_active_mode().unwrap().name, "Professional");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn custom_mode_name_collision_is_rejected() {
        let (mut registry, path) = fresh("collision");
        let err = registry
            .create_custom_mode("Casual", "duplicate", "Professional")
            .unwrap_err();
        assert!(matches!(err, AssistantError::AlreadyExists(_)));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn suggestions_follow_table_order_and_cap_at_three() {
        let (registry, path) = fresh("suggest");
        let suggestions =
            registry.suggest_modes("debug this code for my business research paper idea");
        assert_eq!(suggestions.len(), 3);
        assert_eq!(suggestions[0], "Professional");
        assert_eq!(suggestions[1], "Technical");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn no_keyword_match_suggests_current_mode() {
        let (registry, path) = fresh("suggest-current");
        let suggestions = registry.suggest_modes("hello there");
        assert_eq!(suggestions, vec!["Professional".to_string()]);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn update_mode_overwrites_only_given_fields() {
        let (mut registry, path) = fresh("update");
        let update = ModeUpdate {
            description: Some("rewritten".to_string()),
            ..Default::default()
        };
        registry.update_mode("Casual", update).unwrap();
        let casual = &registry.modes[registry.find("Casual").unwrap()];
        assert_eq!(casual.description, "rewritten");
        assert_eq!(casual.response_style, "warm and conversational");
        let _ = std::fs::remove_file(path);
    }
}
