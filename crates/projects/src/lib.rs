//! `taskforge-projects`: project, team, and task use-cases.
//!
//! Every operation takes the caller's [`Identity`](taskforge_auth::Identity)
//! explicitly and consults the authorization policy before touching storage.

pub mod model;
pub mod projects;
pub mod service;
pub mod store;
pub mod tasks;
pub mod teams;

#[cfg(test)]
pub(crate) mod fakes;

pub use model::{Member, MemberFilter, Project, Task, TaskFilter, Team};
pub use projects::{CreateProject, DeleteProject, UpdateProject};
pub use service::ProjectService;
pub use store::{MemberLookup, ProjectStore, TeamMembership};
pub use tasks::{CreateTask, DeleteTask, UpdateTask};
pub use teams::{CreateTeam, DeleteTeam, UpdateTeam};
