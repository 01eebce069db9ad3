use crate::common::NodeId;
use crate::errors::{new_err, ErrorKind, Result};
use crate::leadership::status::{LeaderPhase, Role};

/// Owner of the node role. Every change goes through one of the transition methods, which
/// refuse moves the role graph does not allow.
#[derive(Debug)]
pub struct RoleStateMachine {
    node_id: NodeId,
    role: Role,
}

impl RoleStateMachine {
    pub fn new(node_id: NodeId) -> RoleStateMachine {
        RoleStateMachine {
            node_id,
            role: Role::Follower,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_follower(&self) -> bool {
        self.role == Role::Follower
    }

    pub fn can_accept_writes(&self) -> bool {
        self.role == Role::Leader(LeaderPhase::Active)
    }

    /// Follower -> dry-run candidate, dry-run candidate -> real candidate.
    pub fn become_candidate(&mut self, dry_run: bool) -> Result<()> {
        match (self.role, dry_run) {
            (Role::Follower, true) | (Role::Candidate { dry_run: true }, false) => {
                self.change_role(Role::Candidate { dry_run });
                Ok(())
            }
            _ => self.invalid_transition("become candidate"),
        }
    }

    pub fn become_leader(&mut self) -> Result<()> {
        match self.role {
            Role::Candidate { dry_run: false } => {
                self.change_role(Role::Leader(LeaderPhase::CatchingUp));
                Ok(())
            }
            _ => self.invalid_transition("become leader"),
        }
    }

    pub fn enter_draining(&mut self) -> Result<()> {
        match self.role {
            Role::Leader(LeaderPhase::CatchingUp) => {
                self.change_role(Role::Leader(LeaderPhase::Draining));
                Ok(())
            }
            _ => self.invalid_transition("enter drain mode"),
        }
    }

    pub fn activate(&mut self) -> Result<()> {
        match self.role {
            Role::Leader(LeaderPhase::Draining) => {
                self.change_role(Role::Leader(LeaderPhase::Active));
                Ok(())
            }
            _ => self.invalid_transition("accept writes"),
        }
    }

    /// Candidate or leader -> Follower. Returns the role that was left, or None when there was
    /// nothing to step down from.
    pub fn step_down(&mut self) -> Option<Role> {
        match self.role {
            Role::Candidate { .. } | Role::Leader(_) => {
                let previous = self.role;
                self.change_role(Role::Follower);
                Some(previous)
            }
            Role::Follower | Role::Rollback => None,
        }
    }

    pub fn enter_rollback(&mut self) -> Result<()> {
        match self.role {
            Role::Follower | Role::Candidate { .. } => {
                self.change_role(Role::Rollback);
                Ok(())
            }
            _ => self.invalid_transition("enter rollback"),
        }
    }

    pub fn leave_rollback(&mut self) -> Result<()> {
        match self.role {
            Role::Rollback => {
                self.change_role(Role::Follower);
                Ok(())
            }
            _ => self.invalid_transition("leave rollback"),
        }
    }

    fn change_role(&mut self, role: Role) {
        info!("Node {} Status changed from {} to {}", self.node_id, self.role, role);
        self.role = role;
    }

    fn invalid_transition<T>(&self, action: &str) -> Result<T> {
        new_err(
            ErrorKind::InvalidRole,
            format!("Node {} cannot {}", self.node_id, action),
            format!("current role is {}", self.role),
        )
    }
}
