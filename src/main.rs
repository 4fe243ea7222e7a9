use std::io::{BufRead, Write};

use anyhow::Context;

use artifix::collaborators::{
    Collaborators, LlmClient, LocalFileManager, ShellDevTools, ShellSystemControl, WikiClient,
};
use artifix::services::{IntentRouter, MemoryStore, ModeRegistry, ReminderCallback, TaskStore};
use artifix::utils::config;

fn main() -> anyhow::Result<()> {
    config::load_dotenv();
    env_logger::init();

    let data_dir = config::data_dir();
    let settings = config::read_settings(&data_dir);
    if let Err(e) = config::write_settings(&data_dir, &settings) {
        log::warn!("could not persist settings: {}", e);
    }

    let modes = ModeRegistry::new(data_dir.join("config").join("agent_modes.json"));
    let memory = MemoryStore::new(data_dir.join("memory").join("assistant_memory.db"))
        .context("opening memory store")?;
    let tasks = TaskStore::new(data_dir.join("memory").join("tasks.db"))
        .context("opening task store")?;

    let mut collab = Collaborators {
        wiki: Some(Box::new(WikiClient::new())),
        system: Some(Box::new(ShellSystemControl)),
        files: Some(Box::new(LocalFileManager::from_home())),
        dev: Some(Box::new(ShellDevTools::in_current_dir())),
        ..Default::default()
    };
    if settings.ai.enabled {
        collab.ai = Some(Box::new(LlmClient::new(&settings.ai)));
    }

    let mut router = IntentRouter::new(modes, memory, tasks, collab);

    let callbacks: Vec<ReminderCallback> = vec![Box::new(|reminder| {
        println!("\n[reminder] {}: {}", reminder.title, reminder.message);
    })];
    router.tasks_mut().start_reminder_monitoring(callbacks);

    println!("Artifix ready. Type a query, or 'quit' to exit.");
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }
        println!("{}", router.respond(line));
    }

    router.tasks_mut().stop_reminder_monitoring();
    if let Err(e) = router.memory_mut().end_session(None) {
        log::warn!("failed to close session: {}", e);
    }
    Ok(())
}
