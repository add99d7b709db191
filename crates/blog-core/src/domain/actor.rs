use uuid::Uuid;

/// Roles that grant every blog permission.
const SUPER_ROLES: [&str; 2] = ["owner", "admin"];

/// Permissions checked by blog operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Create, edit, publish and delete posts.
    ManageBlog,
    /// Change the blog settings of a shop.
    BlogSettings,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ManageBlog => "manageBlog",
            Permission::BlogSettings => "blog/settings",
        }
    }
}

/// The authenticated caller of a blog operation.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: Uuid,
    pub roles: Vec<String>,
}

impl Actor {
    pub fn new(user_id: Uuid, roles: Vec<String>) -> Self {
        Self { user_id, roles }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn can(&self, permission: Permission) -> bool {
        SUPER_ROLES.iter().any(|r| self.has_role(r)) || self.has_role(permission.as_str())
    }

    /// Blog admins see hidden posts and may filter by visibility.
    pub fn is_blog_admin(&self) -> bool {
        self.can(Permission::ManageBlog)
    }
}
