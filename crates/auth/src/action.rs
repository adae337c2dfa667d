use serde::Serialize;

/// Kind of resource an operation targets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Project,
    Team,
    Task,
    Member,
}

/// What is being done to the resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Operation::Read)
    }
}

/// A requested operation on a resource kind (e.g. `project.delete`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Action {
    pub resource: Resource,
    pub operation: Operation,
}

impl Action {
    pub const fn new(resource: Resource, operation: Operation) -> Self {
        Self {
            resource,
            operation,
        }
    }

    pub const fn read(resource: Resource) -> Self {
        Self::new(resource, Operation::Read)
    }

    pub const fn create(resource: Resource) -> Self {
        Self::new(resource, Operation::Create)
    }

    pub const fn update(resource: Resource) -> Self {
        Self::new(resource, Operation::Update)
    }

    pub const fn delete(resource: Resource) -> Self {
        Self::new(resource, Operation::Delete)
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let resource = match self.resource {
            Resource::Project => "project",
            Resource::Team => "team",
            Resource::Task => "task",
            Resource::Member => "member",
        };
        let operation = match self.operation {
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        write!(f, "{resource}.{operation}")
    }
}
