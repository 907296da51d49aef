//! Seed roster created during setup

use crate::error::ConfigResult;
use crate::validation::{validate_required_string, Validatable};
use reviewload_core::{Membership, Team, User};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Fixed teams and users registered before the steady state starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub teams: Vec<SeedTeam>,
    pub users: Vec<SeedUser>,
}

/// Team entry: a name and member user ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedTeam {
    pub name: String,
    pub members: Vec<String>,
}

/// User entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedUser {
    pub id: String,
    pub name: String,
}

impl SeedConfig {
    pub fn user(&self, id: &str) -> Option<User> {
        self.users.iter().find(|user| user.id == id).map(|user| User {
            id: user.id.clone(),
            display_name: user.name.clone(),
        })
    }

    /// Resolve the roster into teams with active memberships.
    ///
    /// Members that do not reference a known user are dropped; validation
    /// rejects such rosters up front.
    pub fn teams(&self) -> Vec<Team> {
        self.teams
            .iter()
            .map(|team| Team {
                name: team.name.clone(),
                members: team
                    .members
                    .iter()
                    .filter_map(|id| self.user(id))
                    .map(|user| Membership {
                        user_id: user.id,
                        username: user.display_name,
                        is_active: true,
                    })
                    .collect(),
            })
            .collect()
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        let users = DEFAULT_USERS
            .iter()
            .enumerate()
            .map(|(index, name)| SeedUser {
                id: format!("user{}", index + 1),
                name: name.to_string(),
            })
            .collect();

        let teams = DEFAULT_TEAMS
            .iter()
            .enumerate()
            .map(|(team_index, name)| SeedTeam {
                name: name.to_string(),
                members: (1..=TEAM_SIZE)
                    .map(|member| format!("user{}", team_index * TEAM_SIZE + member))
                    .collect(),
            })
            .collect();

        Self { teams, users }
    }
}

impl Validatable for SeedConfig {
    fn validate(&self) -> ConfigResult<()> {
        let mut user_ids = HashSet::new();
        for user in &self.users {
            validate_required_string(&user.id, "user id", self.domain_name())?;
            if !user_ids.insert(user.id.as_str()) {
                return Err(self.validation_error(format!("duplicate user id '{}'", user.id)));
            }
        }

        let mut team_names = HashSet::new();
        for team in &self.teams {
            validate_required_string(&team.name, "team name", self.domain_name())?;
            if !team_names.insert(team.name.as_str()) {
                return Err(self.validation_error(format!("duplicate team name '{}'", team.name)));
            }
            if let Some(unknown) = team.members.iter().find(|id| !user_ids.contains(id.as_str())) {
                return Err(self.validation_error(format!(
                    "team '{}' references unknown user '{}'",
                    team.name, unknown
                )));
            }
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "seed"
    }
}

const TEAM_SIZE: usize = 5;

const DEFAULT_TEAMS: [&str; 3] = ["backend-team", "frontend-team", "devops-team"];

const DEFAULT_USERS: [&str; 15] = [
    "Alice", "Bob", "Charlie", "David", "Eve", "Frank", "Grace", "Henry", "Ivy", "Jack", "Karen",
    "Leo", "Mia", "Nathan", "Olivia",
];
