use chrono::{Duration as ChronoDuration, Local, Utc};
use regex::Regex;

use crate::collaborators::{Collaborators, PowerAction, VolumeAction};
use crate::error::{AssistantError, Result};
use crate::models::{Event, Reminder, Task, TaskSortKey, TaskStatus};
use crate::services::mode_registry::ModeRegistry;
use crate::services::memory_store::MemoryStore;
use crate::services::personalizer::personalize;
use crate::services::task_store::TaskStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Vision,
    Volume,
    AppLaunch,
    SystemInfo,
    Power,
    FileOps,
    FileSearch,
    Tasks,
    Calendar,
    Email,
    Translate,
    Git,
    DevTasks,
    AgentMode,
    MemoryRecall,
    WhoIs,
    TimeDate,
}

/// Ordered dispatch table. First category whose keyword disjunction
/// matches wins; a query matching several categories is committed to
/// the earliest one, so the order here is load-bearing.
const DISPATCH: &[(Category, &[&str])] = &[
    (
        Category::Vision,
        &["what do you see", "describe the scene", "look at", "use the camera"],
    ),
    (Category::Volume, &["volume", "sound", "mute"]),
    (Category::AppLaunch, &["open ", "launch "]),
    (
        Category::SystemInfo,
        &["system info", "system status", "cpu", "memory usage", "battery"],
    ),
    (
        Category::Power,
        &["shutdown", "shut down", "restart", "reboot", "go to sleep", "lock the screen", "lock screen"],
    ),
    (
        Category::FileOps,
        &["list files", "create file", "create folder", "delete file", "delete folder", "move file"],
    ),
    (
        Category::FileSearch,
        &["find file", "search file", "locate file", "find a file"],
    ),
    (Category::Tasks, &["task", "todo", "to-do", "remind me"]),
    (
        Category::Calendar,
        &["calendar", "schedule", "event", "meeting"],
    ),
    (Category::Email, &["email", "send mail", "slack"]),
    (Category::Translate, &["translate"]),
    (
        Category::Git,
        &["git", "commit", "push", "pull", "repository"],
    ),
    (
        Category::DevTasks,
        &["run tests", "run the tests", "lint", "build the project", "run build"],
    ),
    (Category::AgentMode, &["mode", "personality"]),
    (
        Category::MemoryRecall,
        &["remember", "recall", "what did i", "what did we"],
    ),
    (Category::WhoIs, &["who is"]),
    (
        Category::TimeDate,
        &["the time", "what time", "the date", "what day"],
    ),
];

/// Visual-reference keywords that pull a scene description into the
/// fallback AI prompt when the camera is active.
const VISUAL_KEYWORDS: &[&str] = &["see", "look", "show", "what's", "camera", "picture", "image"];

/// Keyword table behind context-tag derivation; a query can earn
/// several tags.
const TAG_TABLE: &[(&str, &[&str])] = &[
    ("time", &["time", "date", "clock"]),
    ("tasks", &["task", "todo", "remind"]),
    ("calendar", &["calendar", "schedule", "meeting", "event"]),
    ("files", &["file", "folder", "directory"]),
    (
        "system",
        &["volume", "shutdown", "restart", "system", "battery"],
    ),
    (
        "development",
        &["git", "code", "test", "build", "debug", "lint"],
    ),
    ("knowledge", &["who is", "what is", "explain"]),
    ("modes", &["mode", "personality"]),
];

/// The routing core: owns the mode registry, both stores and the
/// collaborator set, and turns each utterance into a response string.
/// `respond` never returns an error; failures become user-facing text.
pub struct IntentRouter {
    modes: ModeRegistry,
    memory: MemoryStore,
    tasks: TaskStore,
    collab: Collaborators,
}

impl IntentRouter {
    pub fn new(
        modes: ModeRegistry,
        memory: MemoryStore,
        tasks: TaskStore,
        collab: Collaborators,
    ) -> Self {
        Self {
            modes,
            memory,
            tasks,
            collab,
        }
    }

    pub fn modes(&self) -> &ModeRegistry {
        &self.modes
    }

    pub fn modes_mut(&mut self) -> &mut ModeRegistry {
        &mut self.modes
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut MemoryStore {
        &mut self.memory
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut TaskStore {
        &mut self.tasks
    }

    /// Handle one conversation turn. The exchange is recorded before
    /// the personalizer runs, so the caller always receives a response
    /// that is already part of durable history.
    pub fn respond(&mut self, input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            // Rejected turns are not recorded.
            return AssistantError::InvalidInput.user_message();
        }
        let query = trimmed.to_lowercase();

        let response = match self.dispatch(&query) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("handler failed for '{}': {}", query, e);
                e.user_message()
            }
        };

        let tags = derive_context_tags(&query);
        if let Err(e) = self.memory.save_conversation(trimmed, &response, &tags, 1) {
            log::error!("failed to record exchange: {}", e);
        }

        personalize(self.modes.get_active_mode(), &response)
    }

    fn dispatch(&mut self, query: &str) -> Result<String> {
        let category = DISPATCH
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|kw| query.contains(kw)))
            .map(|(category, _)| *category);

        match category {
            Some(Category::Vision) => self.handle_vision(),
            Some(Category::Volume) => self.handle_volume(query),
            Some(Category::AppLaunch) => self.handle_app_launch(query),
            Some(Category::SystemInfo) => self.handle_system_info(),
            Some(Category::Power) => self.handle_power(query),
            Some(Category::FileOps) => self.handle_file_ops(query),
            Some(Category::FileSearch) => self.handle_file_search(query),
            Some(Category::Tasks) => self.handle_tasks(query),
            Some(Category::Calendar) => self.handle_calendar(query),
            Some(Category::Email) => self.handle_email(query),
            Some(Category::Translate) => self.handle_translate(query),
            Some(Category::Git) => self.handle_git(query),
            Some(Category::DevTasks) => self.handle_dev_tasks(query),
            Some(Category::AgentMode) => self.handle_agent_mode(query),
            Some(Category::MemoryRecall) => self.handle_memory_recall(query),
            Some(Category::WhoIs) => self.handle_who_is(query),
            Some(Category::TimeDate) => Ok(self.handle_time_date(query)),
            None => self.handle_fallback(query),
        }
    }

    fn handle_vision(&self) -> Result<String> {
        let Some(camera) = &self.collab.camera else {
            return Ok("Camera support is not configured.".to_string());
        };
        if !camera.is_active() {
            return Ok("The camera is not active right now.".to_string());
        }
        camera.describe_scene()
    }

    fn handle_volume(&self, query: &str) -> Result<String> {
        let Some(system) = &self.collab.system else {
            return Ok("System control is not configured.".to_string());
        };

        let level = Regex::new(r"(\d{1,3})\s*%?\s*$")
            .unwrap()
            .captures(query)
            .and_then(|c| c[1].parse::<u8>().ok());

        let action = if query.contains("mute") {
            Some(VolumeAction::Mute)
        } else if let Some(level) = level {
            Some(VolumeAction::Set(level))
        } else if ["up", "increase", "raise", "louder"]
            .iter()
            .any(|kw| query.contains(kw))
        {
            Some(VolumeAction::Up)
        } else if ["down", "decrease", "lower", "quieter"]
            .iter()
            .any(|kw| query.contains(kw))
        {
            Some(VolumeAction::Down)
        } else {
            None
        };

        match action {
            Some(action) => system.control_volume(action),
            None => Ok(
                "Available volume operations: up, down, mute, set <level>.".to_string(),
            ),
        }
    }

    fn handle_app_launch(&self, query: &str) -> Result<String> {
        let Some(system) = &self.collab.system else {
            return Ok("System control is not configured.".to_string());
        };
        let app = query
            .strip_prefix("open ")
            .or_else(|| query.strip_prefix("launch "))
            .unwrap_or("")
            .trim();
        if app.is_empty() {
            return Ok("Tell me which application to open, e.g. 'open firefox'.".to_string());
        }
        system.launch_application(app)
    }

    fn handle_system_info(&self) -> Result<String> {
        let Some(system) = &self.collab.system else {
            return Ok("System control is not configured.".to_string());
        };
        system.system_info()
    }

    fn handle_power(&self, query: &str) -> Result<String> {
        let Some(system) = &self.collab.system else {
            return Ok("System control is not configured.".to_string());
        };
        let action = if query.contains("lock") {
            Some(PowerAction::Lock)
        } else if query.contains("sleep") {
            Some(PowerAction::Sleep)
        } else if query.contains("restart") || query.contains("reboot") {
            Some(PowerAction::Restart)
        } else if query.contains("shutdown") || query.contains("shut down") {
            Some(PowerAction::Shutdown)
        } else {
            None
        };
        match action {
            Some(action) => system.power(action),
            None => Ok(
                "Available power operations: lock screen, sleep, restart, shutdown.".to_string(),
            ),
        }
    }

    fn handle_file_ops(&self, query: &str) -> Result<String> {
        let Some(files) = &self.collab.files else {
            return Ok("File management is not configured.".to_string());
        };

        if query.contains("list files") {
            let dir = Regex::new(r"list files (?:in|under) (.+)$")
                .unwrap()
                .captures(query)
                .map(|c| c[1].trim().to_string());
            return files.list_directory(dir.as_deref());
        }
        if let Some(captures) = Regex::new(r"create file (?:called |named )?(.+)$")
            .unwrap()
            .captures(query)
        {
            return files.create_file(captures[1].trim());
        }
        if let Some(captures) = Regex::new(r"create folder (?:called |named )?(.+)$")
            .unwrap()
            .captures(query)
        {
            return files.create_folder(captures[1].trim());
        }
        if let Some(captures) = Regex::new(r"delete (?:file|folder) (.+)$")
            .unwrap()
            .captures(query)
        {
            return files.delete_path(captures[1].trim());
        }
        if let Some(captures) = Regex::new(r"move file (.+) to (.+)$")
            .unwrap()
            .captures(query)
        {
            return files.move_path(captures[1].trim(), captures[2].trim());
        }

        Ok("Available file operations: list files [in <dir>], create file <name>, \
            create folder <name>, delete file <name>, move file <from> to <to>."
            .to_string())
    }

    fn handle_file_search(&self, query: &str) -> Result<String> {
        let Some(files) = &self.collab.files else {
            return Ok("File management is not configured.".to_string());
        };
        let pattern = Regex::new(r"(?:find|search|locate) (?:a )?files? (?:for |named |called )?(.+)$")
            .unwrap()
            .captures(query)
            .map(|c| c[1].trim().to_string());
        match pattern {
            Some(pattern) if !pattern.is_empty() => files.search_files(&pattern),
            _ => Ok("Tell me what to look for, e.g. 'find file report'.".to_string()),
        }
    }

    fn handle_tasks(&mut self, query: &str) -> Result<String> {
        if query.contains("remind me") {
            return self.handle_reminder(query);
        }

        if let Some(captures) = Regex::new(r"(?:add|create|new) (?:a )?task (?:to |called )?(.+)$")
            .unwrap()
            .captures(query)
        {
            let title = captures[1].trim();
            let id = self.tasks.add_task(&Task::new(title))?;
            return Ok(format!("Added task #{}: {}", id, title));
        }

        if query.contains("list") || query.contains("show") || query.contains("my tasks") {
            let tasks =
                self.tasks
                    .get_tasks(Some(TaskStatus::Pending), None, 20, TaskSortKey::DueDate)?;
            if tasks.is_empty() {
                return Ok("You have no pending tasks.".to_string());
            }
            let lines: Vec<String> = tasks.iter().map(format_task_line).collect();
            return Ok(format!("Pending tasks:\n{}", lines.join("\n")));
        }

        if let Some(captures) = Regex::new(r"(?:complete|finish|done with) task (?:#)?(\d+)")
            .unwrap()
            .captures(query)
        {
            let id: i64 = captures[1].parse().unwrap_or(0);
            self.tasks.complete_task(id)?;
            return Ok(format!("Task #{} completed.", id));
        }

        if let Some(captures) = Regex::new(r"(?:delete|remove) task (?:#)?(\d+)")
            .unwrap()
            .captures(query)
        {
            let id: i64 = captures[1].parse().unwrap_or(0);
            self.tasks.delete_task(id)?;
            return Ok(format!("Task #{} deleted.", id));
        }

        Ok("Available task operations: add task <title>, list tasks, \
            complete task <id>, delete task <id>, remind me to <something> in <n> minutes."
            .to_string())
    }

    fn handle_reminder(&mut self, query: &str) -> Result<String> {
        let offset = Regex::new(r"in (\d+) (minute|hour)s?")
            .unwrap()
            .captures(query)
            .and_then(|c| {
                let amount: i64 = c[1].parse().ok()?;
                let minutes = if &c[2] == "hour" { amount * 60 } else { amount };
                Some(minutes)
            });

        let Some(minutes) = offset else {
            return Ok(
                "Tell me when, e.g. 'remind me to stretch in 30 minutes'.".to_string(),
            );
        };

        let message = Regex::new(r"remind me (?:to )?(.+?)(?: in \d+ (?:minute|hour)s?)?$")
            .unwrap()
            .captures(query)
            .map(|c| c[1].trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "Reminder".to_string());

        let at = Utc::now() + ChronoDuration::minutes(minutes);
        self.tasks
            .add_reminder(&Reminder::new(&message, &message, at))?;
        Ok(format!(
            "Reminder set: \"{}\" in {} minute{}.",
            message,
            minutes,
            if minutes == 1 { "" } else { "s" }
        ))
    }

    fn handle_calendar(&self, query: &str) -> Result<String> {
        if query.contains("busy") || query.contains("optimi") {
            let suggestions = self.tasks.suggest_schedule_optimization()?;
            if suggestions.is_empty() {
                return Ok("Your schedule looks fine.".to_string());
            }
            return Ok(suggestions.join("\n"));
        }

        let (label, events) = if query.contains("today") {
            ("today", self.tasks.get_today_events()?)
        } else {
            ("in the next 7 days", self.tasks.get_upcoming_events(7)?)
        };

        if events.is_empty() {
            return Ok(format!("No events {}.", label));
        }
        let lines: Vec<String> = events.iter().map(format_event_line).collect();
        Ok(format!("Events {}:\n{}", label, lines.join("\n")))
    }

    fn handle_email(&self, query: &str) -> Result<String> {
        let Some(comms) = &self.collab.comms else {
            return Ok("Email and messaging are not configured.".to_string());
        };
        if let Some(captures) = Regex::new(r"email (?:to )?(\S+) (?:saying|about|that) (.+)$")
            .unwrap()
            .captures(query)
        {
            return comms.send_email(captures[1].trim(), "Message from Artifix", captures[2].trim());
        }
        if let Some(captures) = Regex::new(r"slack (?:message )?(?:to )?(\S+) (?:saying|that) (.+)$")
            .unwrap()
            .captures(query)
        {
            return comms.send_message(captures[1].trim(), captures[2].trim());
        }
        Ok("Available communication operations: email <address> saying <text>, \
            slack <channel> saying <text>."
            .to_string())
    }

    fn handle_translate(&self, query: &str) -> Result<String> {
        let Some(translator) = &self.collab.translator else {
            return Ok("Translation is not configured.".to_string());
        };
        match Regex::new(r"translate (.+) (?:to|into) (\w+)$")
            .unwrap()
            .captures(query)
        {
            Some(captures) => translator.translate(captures[1].trim(), captures[2].trim()),
            None => Ok("Say e.g. 'translate good morning to french'.".to_string()),
        }
    }

    fn handle_git(&self, query: &str) -> Result<String> {
        let Some(dev) = &self.collab.dev else {
            return Ok("Developer tools are not configured.".to_string());
        };
        if let Some(captures) = Regex::new(r"commit (?:with message |saying )(.+)$")
            .unwrap()
            .captures(query)
        {
            return dev.git_commit(captures[1].trim());
        }
        if query.contains("pull") {
            return dev.git_pull();
        }
        if query.contains("push") {
            return dev.git_push();
        }
        if query.contains("status") || query.contains("git") || query.contains("repository") {
            return dev.git_status();
        }
        Ok("Available git operations: status, pull, push, commit saying <message>.".to_string())
    }

    fn handle_dev_tasks(&self, query: &str) -> Result<String> {
        let Some(dev) = &self.collab.dev else {
            return Ok("Developer tools are not configured.".to_string());
        };
        if query.contains("test") {
            dev.run_tests()
        } else if query.contains("lint") {
            dev.run_lint()
        } else {
            dev.run_build()
        }
    }

    fn handle_agent_mode(&mut self, query: &str) -> Result<String> {
        if query.contains("list") || query.contains("available") {
            let names: Vec<String> = self
                .modes
                .list_modes()
                .into_iter()
                .map(|m| {
                    if m.active {
                        format!("{} (active)", m.name)
                    } else {
                        m.name
                    }
                })
                .collect();
            return Ok(format!("Available modes: {}", names.join(", ")));
        }

        if query.contains("suggest") {
            let suggestions = self.modes.suggest_modes(query);
            return Ok(format!("Suggested modes: {}", suggestions.join(", ")));
        }

        if let Some(captures) = Regex::new(r"(?:switch to|change to|activate) (?:the )?(\w+)(?: mode)?")
            .unwrap()
            .captures(query)
        {
            let requested = captures[1].to_string();
            let name = self
                .modes
                .list_modes()
                .into_iter()
                .map(|m| m.name)
                .find(|name| name.to_lowercase() == requested);
            return match name {
                Some(name) => self.modes.set_active_mode(&name),
                None => Err(AssistantError::not_found("Mode", requested)),
            };
        }

        Ok("Available mode operations: list modes, switch to <name> mode, \
            suggest a mode."
            .to_string())
    }

    fn handle_memory_recall(&self, query: &str) -> Result<String> {
        let topic = Regex::new(r"about (.+)$")
            .unwrap()
            .captures(query)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_else(|| query.to_string());

        let hits = self.memory.search_conversations(&topic, 5)?;
        if hits.is_empty() {
            return Ok("I couldn't find anything about that in our conversations.".to_string());
        }
        let lines: Vec<String> = hits
            .iter()
            .map(|e| format!("[{}] You: {} / Me: {}", e.timestamp, e.user_input, e.assistant_response))
            .collect();
        Ok(format!("Here's what I found:\n{}", lines.join("\n")))
    }

    fn handle_who_is(&self, query: &str) -> Result<String> {
        let Some(wiki) = &self.collab.wiki else {
            return Ok("Encyclopedia lookup is not configured.".to_string());
        };
        let term = query.replace("who is", "");
        Ok(wiki.lookup(term.trim()))
    }

    fn handle_time_date(&self, query: &str) -> String {
        if query.contains("date") || query.contains("day") {
            format!("Today is {}.", Local::now().format("%A, %B %d, %Y"))
        } else {
            format!("The time is {}.", Local::now().format("%H:%M:%S"))
        }
    }

    /// Fallback: compose the active mode's prompt, recent context and
    /// (when the camera is live and the query references something
    /// visual) a scene description, then ask the conversational AI.
    fn handle_fallback(&self, query: &str) -> Result<String> {
        let Some(ai) = &self.collab.ai else {
            return Err(AssistantError::collaborator(
                "assistant AI",
                "no conversational AI configured",
            ));
        };

        let mut prompt = self.modes.system_prompt();
        let context = self.memory.get_current_context();
        if !context.is_empty() {
            prompt.push_str("\n\nRecent conversation:\n");
            prompt.push_str(&context);
        }
        if let Some(camera) = &self.collab.camera {
            if camera.is_active() && VISUAL_KEYWORDS.iter().any(|kw| query.contains(kw)) {
                match camera.describe_scene() {
                    Ok(scene) => {
                        prompt.push_str("\n\nCurrent scene: ");
                        prompt.push_str(&scene);
                    }
                    Err(e) => log::warn!("scene description failed: {}", e),
                }
            }
        }
        prompt.push_str("\n\nUser: ");
        prompt.push_str(query);

        ai.ask(&prompt)
    }
}

fn derive_context_tags(query: &str) -> Vec<String> {
    TAG_TABLE
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| query.contains(kw)))
        .map(|(tag, _)| tag.to_string())
        .collect()
}

fn format_task_line(task: &Task) -> String {
    let due = task
        .due_date
        .map(|d| format!(", due {}", d.format("%Y-%m-%d")))
        .unwrap_or_default();
    format!(
        "#{} {} (priority {}{})",
        task.id.unwrap_or(0),
        task.title,
        task.priority,
        due
    )
}

fn format_event_line(event: &Event) -> String {
    format!(
        "{} at {}",
        event.title,
        event.start_time.format("%Y-%m-%d %H:%M")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{Camera, ConversationalAi, Encyclopedia, SystemControl};
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    struct StubSystem {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl SystemControl for StubSystem {
        fn control_volume(&self, action: VolumeAction) -> Result<String> {
            self.calls.lock().unwrap().push(format!("volume {:?}", action));
            Ok("Volume increased".to_string())
        }

        fn launch_application(&self, app: &str) -> Result<String> {
            self.calls.lock().unwrap().push(format!("launch {}", app));
            Ok(format!("Launched {}", app))
        }

        fn system_info(&self) -> Result<String> {
            Ok("OS: test".to_string())
        }

        fn power(&self, action: PowerAction) -> Result<String> {
            self.calls.lock().unwrap().push(format!("power {:?}", action));
            Ok("done".to_string())
        }
    }

    struct StubWiki;

    impl Encyclopedia for StubWiki {
        fn lookup(&self, term: &str) -> String {
            format!("According to Wikipedia: {} was notable.", term)
        }
    }

    struct StubAi;

    impl ConversationalAi for StubAi {
        fn ask(&self, query: &str) -> Result<String> {
            Ok(format!("AI says: {}", query.lines().last().unwrap_or("")))
        }
    }

    struct StubCamera;

    impl Camera for StubCamera {
        fn is_active(&self) -> bool {
            true
        }

        fn describe_scene(&self) -> Result<String> {
            Ok("a desk with two monitors".to_string())
        }
    }

    fn temp_path(tag: &str, ext: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "artifix-router-{}-{}.{}",
            tag,
            std::process::id(),
            ext
        ));
        let _ = std::fs::remove_file(&path);
        path
    }

    fn router_with(tag: &str, collab: Collaborators) -> (IntentRouter, Vec<PathBuf>) {
        let registry_path = temp_path(tag, "json");
        let memory_path = temp_path(&format!("{}-mem", tag), "db");
        let tasks_path = temp_path(&format!("{}-tasks", tag), "db");
        let router = IntentRouter::new(
            ModeRegistry::new(&registry_path),
            MemoryStore::new(&memory_path).unwrap(),
            TaskStore::new(&tasks_path).unwrap(),
            collab,
        );
        (router, vec![registry_path, memory_path, tasks_path])
    }

    fn cleanup(paths: Vec<PathBuf>) {
        for path in paths {
            let _ = std::fs::remove_file(path);
        }
    }

    #[test]
    fn blank_input_gets_the_validation_message_and_is_not_recorded() {
        let (mut router, paths) = router_with("blank", Collaborators::default());
        let response = router.respond("   ");
        assert_eq!(response, "Invalid query. Please provide a valid string.");
        assert!(router
            .memory()
            .get_conversation_history(10, None)
            .unwrap()
            .is_empty());
        cleanup(paths);
    }

    #[test]
    fn volume_beats_file_ops_in_priority_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let collab = Collaborators {
            system: Some(Box::new(StubSystem {
                calls: Arc::clone(&calls),
            })),
            ..Default::default()
        };
        let (mut router, paths) = router_with("priority", collab);

        let response = router.respond("list files and increase volume");
        assert!(response.contains("Volume"));
        assert_eq!(calls.lock().unwrap().as_slice(), ["volume Up"]);
        cleanup(paths);
    }

    #[test]
    fn the_time_matches_the_fixed_pattern() {
        let (mut router, paths) = router_with("time", Collaborators::default());
        let response = router.respond("what is the time");
        let re = Regex::new(r"^The time is \d{2}:\d{2}:\d{2}\.$").unwrap();
        assert!(re.is_match(&response), "unexpected response: {}", response);
        cleanup(paths);
    }

    #[test]
    fn who_is_goes_through_the_encyclopedia() {
        let collab = Collaborators {
            wiki: Some(Box::new(StubWiki)),
            ..Default::default()
        };
        let (mut router, paths) = router_with("whois", collab);
        let response = router.respond("who is ada lovelace");
        assert!(response.starts_with("According to Wikipedia: "));
        assert!(response.contains("ada lovelace"));
        cleanup(paths);
    }

    #[test]
    fn task_round_trip_through_the_router() {
        let (mut router, paths) = router_with("tasks", Collaborators::default());
        // The router normalizes to lowercase before extracting args.
        let added = router.respond("add task Buy milk");
        assert!(added.contains("buy milk"));

        let listing = router.respond("list tasks");
        assert!(listing.contains("buy milk"));
        cleanup(paths);
    }

    #[test]
    fn every_turn_is_recorded_with_tags() {
        let (mut router, paths) = router_with("recorded", Collaborators::default());
        router.respond("what is the time");
        router.respond("add task water the garden");

        let history = router.memory().get_conversation_history(10, None).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].context_tags.contains(&"time".to_string()));
        assert!(history[1].context_tags.contains(&"tasks".to_string()));
        cleanup(paths);
    }

    #[test]
    fn handler_errors_become_response_strings_and_are_recorded() {
        let (mut router, paths) = router_with("errors", Collaborators::default());
        let response = router.respond("complete task 999");
        assert_eq!(response, "Task '999' not found");

        let history = router.memory().get_conversation_history(10, None).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].assistant_response, "Task '999' not found");
        cleanup(paths);
    }

    #[test]
    fn fallback_without_ai_reports_a_processing_error() {
        let (mut router, paths) = router_with("no-ai", Collaborators::default());
        let response = router.respond("tell me something interesting");
        assert!(response.starts_with("Error while processing query: "));
        cleanup(paths);
    }

    #[test]
    fn fallback_prompt_carries_mode_context_and_scene() {
        let collab = Collaborators {
            ai: Some(Box::new(StubAi)),
            camera: Some(Box::new(StubCamera)),
            ..Default::default()
        };
        let (mut router, paths) = router_with("fallback", collab);
        router.respond("hello there");

        let response = router.respond("describe what you can show me please");
        // Vision keywords route to the camera first; use a phrasing
        // that reaches the fallback instead.
        assert!(response.starts_with("AI says: "));
        cleanup(paths);
    }

    #[test]
    fn mode_switch_through_the_router() {
        let (mut router, paths) = router_with("modes", Collaborators::default());
        let response = router.respond("switch to casual mode");
        assert!(response.contains("Switched to Casual mode"));
        assert_eq!(router.modes().get_active_mode().unwrap().name, "Casual");
        cleanup(paths);
    }

    #[test]
    fn reminder_phrases_create_reminders() {
        let (mut router, paths) = router_with("reminder", Collaborators::default());
        let response = router.respond("remind me to stretch in 30 minutes");
        assert!(response.contains("stretch"));
        assert!(response.contains("30 minutes"));
        // Not yet due, so nothing fires.
        assert!(router.tasks().get_due_reminders().unwrap().is_empty());
        cleanup(paths);
    }

    #[test]
    fn memory_recall_finds_previous_exchanges() {
        let (mut router, paths) = router_with("recall", Collaborators::default());
        router.respond("add task call the plumber");
        let response = router.respond("what did we say about plumber");
        assert!(response.contains("plumber"));
        cleanup(paths);
    }
}
