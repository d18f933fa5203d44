//! A pulse-driven host for projects.
//!
//! The board keeps a crew and a set of projects. On every pulse that
//! carries time, each hosted project is executed once per crew member, in
//! crew order. Finished projects are logged and dropped at the end of the
//! pulse.

use tracing::{info, warn};

use habitat_types::{ClockPulse, ProjectId, Stage, Temporal};

use crate::project::Project;

/// Hosts projects and drives them from the clock.
#[derive(Debug)]
pub struct ProjectBoard<W> {
    name: String,
    crew: Vec<W>,
    projects: Vec<Project<W>>,
    completed: u32,
    aborted: u32,
}

impl<W> ProjectBoard<W> {
    /// Create an empty board.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            crew: Vec::new(),
            projects: Vec::new(),
            completed: 0,
            aborted: 0,
        }
    }

    /// Return the board name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a crew member who works on every hosted project.
    pub fn add_crew(&mut self, member: W) {
        self.crew.push(member);
    }

    /// Return the crew.
    pub fn crew(&self) -> &[W] {
        &self.crew
    }

    /// Host a project. Returns its id.
    pub fn add_project(&mut self, project: Project<W>) -> ProjectId {
        let id = project.id();
        info!(board = %self.name, project = project.name(), %id, "Project posted");
        self.projects.push(project);
        id
    }

    /// Look up a hosted (unfinished) project.
    pub fn project(&self, id: ProjectId) -> Option<&Project<W>> {
        self.projects.iter().find(|p| p.id() == id)
    }

    /// Look up a hosted project for modification (adding steps, aborting).
    pub fn project_mut(&mut self, id: ProjectId) -> Option<&mut Project<W>> {
        self.projects.iter_mut().find(|p| p.id() == id)
    }

    /// Number of projects still hosted.
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Whether no project is hosted.
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Number of projects that reached `Done`.
    pub const fn completed(&self) -> u32 {
        self.completed
    }

    /// Number of projects that ended `Aborted`.
    pub const fn aborted(&self) -> u32 {
        self.aborted
    }

    fn work_all(&mut self) {
        for project in &mut self.projects {
            for member in &self.crew {
                if project.is_finished() {
                    break;
                }
                if let Err(error) = project.execute(member) {
                    warn!(
                        board = %self.name,
                        project = project.name(),
                        %error,
                        "Project execution failed; aborting it"
                    );
                    project.abort(error.to_string());
                }
            }
        }
    }

    fn sweep_finished(&mut self) {
        let name = &self.name;
        let completed = &mut self.completed;
        let aborted = &mut self.aborted;
        self.projects.retain(|project| {
            match project.stage() {
                Stage::Done => {
                    *completed = completed.saturating_add(1);
                    info!(board = %name, project = project.name(), "Project completed");
                }
                Stage::Aborted => {
                    *aborted = aborted.saturating_add(1);
                    info!(
                        board = %name,
                        project = project.name(),
                        reason = project.abort_reason().unwrap_or_default(),
                        "Project dropped after abort"
                    );
                }
                _ => return true,
            }
            false
        });
    }
}

impl<W> Temporal for ProjectBoard<W> {
    fn advance(&mut self, pulse: &ClockPulse) -> bool {
        if pulse.elapsed() > 0.0 {
            self.work_all();
        }
        self.sweep_finished();
        true
    }
}
