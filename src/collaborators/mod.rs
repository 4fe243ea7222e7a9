//! Trait seams for every external service the router delegates to.
//!
//! Each collaborator is "string in, string out": operations return a
//! human-readable result and typed errors, and the router renders both
//! into the response text. Anything OS- or API-specific lives behind
//! one of these traits so the routing core stays testable with stubs.

pub mod devtools;
pub mod files;
pub mod llm;
pub mod system;
pub mod wikipedia;

pub use devtools::ShellDevTools;
pub use files::LocalFileManager;
pub use llm::LlmClient;
pub use system::ShellSystemControl;
pub use wikipedia::WikiClient;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeAction {
    Up,
    Down,
    Mute,
    Set(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    Lock,
    Sleep,
    Restart,
    Shutdown,
}

pub trait ConversationalAi {
    /// Send a fully composed prompt and return the model's reply.
    fn ask(&self, query: &str) -> Result<String>;
}

pub trait Encyclopedia {
    /// Look up a term. Disambiguation and not-found are translated to
    /// human-readable strings here; this call never fails.
    fn lookup(&self, term: &str) -> String;
}

pub trait SystemControl {
    fn control_volume(&self, action: VolumeAction) -> Result<String>;
    fn launch_application(&self, app: &str) -> Result<String>;
    fn system_info(&self) -> Result<String>;
    fn power(&self, action: PowerAction) -> Result<String>;
}

pub trait FileManager {
    fn list_directory(&self, path: Option<&str>) -> Result<String>;
    fn create_file(&self, name: &str) -> Result<String>;
    fn create_folder(&self, name: &str) -> Result<String>;
    fn delete_path(&self, name: &str) -> Result<String>;
    fn move_path(&self, from: &str, to: &str) -> Result<String>;
    fn search_files(&self, pattern: &str) -> Result<String>;
}

pub trait DevTools {
    fn git_status(&self) -> Result<String>;
    fn git_pull(&self) -> Result<String>;
    fn git_push(&self) -> Result<String>;
    fn git_commit(&self, message: &str) -> Result<String>;
    fn run_tests(&self) -> Result<String>;
    fn run_lint(&self) -> Result<String>;
    fn run_build(&self) -> Result<String>;
}

pub trait Communicator {
    fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<String>;
    fn send_message(&self, channel: &str, text: &str) -> Result<String>;
}

pub trait Translator {
    fn translate(&self, text: &str, target_lang: &str) -> Result<String>;
}

pub trait Camera {
    fn is_active(&self) -> bool;
    fn describe_scene(&self) -> Result<String>;
}

/// The full collaborator set handed to the router. Every slot is
/// optional; a missing collaborator turns the matching handlers into
/// "not configured" responses instead of failures.
#[derive(Default)]
pub struct Collaborators {
    pub ai: Option<Box<dyn ConversationalAi>>,
    pub wiki: Option<Box<dyn Encyclopedia>>,
    pub system: Option<Box<dyn SystemControl>>,
    pub files: Option<Box<dyn FileManager>>,
    pub dev: Option<Box<dyn DevTools>>,
    pub comms: Option<Box<dyn Communicator>>,
    pub translator: Option<Box<dyn Translator>>,
    pub camera: Option<Box<dyn Camera>>,
}
