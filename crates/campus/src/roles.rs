//! Portal roles and their navigation trees.
//!
//! Every signed-in user has exactly one role. The role decides which area
//! of the portal they may enter (`/admin`, `/teacher`, `/student`), where
//! they land after login, and which sidebar they see.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A portal role, as sent by the backend in `role.name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

/// `role.name` did not name a known role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Teacher, Role::Student];

    /// The wire name (`ADMIN`, `TEACHER`, `STUDENT`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Teacher => "TEACHER",
            Self::Student => "STUDENT",
        }
    }

    /// Prefix of every route this role may visit.
    pub fn path_prefix(&self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::Teacher => "/teacher",
            Self::Student => "/student",
        }
    }

    /// Where the role lands after login or when it strays outside its
    /// area.
    pub fn home_path(&self) -> &'static str {
        match self {
            Self::Admin => "/admin/dashboard",
            Self::Teacher => "/teacher/dashboard",
            Self::Student => "/student/dashboard",
        }
    }

    /// The sidebar for this role.
    pub fn navigation(&self) -> &'static [MenuItem] {
        match self {
            Self::Admin => ADMIN_MENU,
            Self::Teacher => TEACHER_MENU,
            Self::Student => STUDENT_MENU,
        }
    }

    /// Whether `path` lies inside this role's area.
    pub fn owns_path(&self, path: &str) -> bool {
        path.starts_with(self.path_prefix())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Navigation trees
// ---------------------------------------------------------------------------

/// One sidebar entry. Children form a nested menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub title: &'static str,
    /// Font Awesome class list.
    pub icon: Option<&'static str>,
    pub path: &'static str,
    pub children: &'static [MenuItem],
}

impl MenuItem {
    const fn leaf(title: &'static str, icon: &'static str, path: &'static str) -> Self {
        Self {
            title,
            icon: Some(icon),
            path,
            children: &[],
        }
    }

    const fn child(title: &'static str, path: &'static str) -> Self {
        Self {
            title,
            icon: None,
            path,
            children: &[],
        }
    }

    /// Depth-first walk over this item and its descendants.
    pub fn walk(&self) -> Vec<&MenuItem> {
        let mut out = vec![self];
        for child in self.children {
            out.extend(child.walk());
        }
        out
    }
}

const ADMIN_MENU: &[MenuItem] = &[
    MenuItem::leaf("Dashboard", "fas fa-gauge", "/admin/dashboard"),
    MenuItem::leaf("Departments", "fas fa-university", "/admin/departments"),
    MenuItem::leaf("Majors", "fas fa-layer-group", "/admin/majors"),
    MenuItem::leaf("Classes", "fas fa-users-rectangle", "/admin/classes"),
    MenuItem {
        title: "Users",
        icon: Some("fas fa-user-gear"),
        path: "/admin/users",
        children: &[
            MenuItem::child("Administrators", "/admin/admins"),
            MenuItem::child("Students", "/admin/students"),
            MenuItem::child("Teachers", "/admin/teachers"),
        ],
    },
    MenuItem::leaf("Courses", "fas fa-book-atlas", "/admin/courses"),
    MenuItem::leaf(
        "Curriculum programs",
        "fas fa-folder-plus",
        "/admin/curriculum-programs",
    ),
    MenuItem::leaf("Classrooms", "fas fa-school", "/admin/classrooms"),
    MenuItem::leaf(
        "Course classes",
        "fas fa-clipboard-list",
        "/admin/course-classes",
    ),
];

const STUDENT_MENU: &[MenuItem] = &[
    MenuItem::leaf("Dashboard", "fas fa-tachometer-alt", "/student/dashboard"),
    MenuItem::leaf(
        "Class schedule",
        "fas fa-calendar-days",
        "/student/class-schedule",
    ),
    MenuItem::leaf(
        "Course registration",
        "fas fa-clipboard-check",
        "/student/register-course",
    ),
    MenuItem::leaf("Results", "fas fa-award", "/student/results"),
    MenuItem::leaf(
        "Curriculum programs",
        "fas fa-sitemap",
        "/student/curriculum-programs",
    ),
    MenuItem::leaf(
        "Registration fees",
        "fas fa-money-check-dollar",
        "/student/registration-fee-detail",
    ),
    MenuItem::leaf("Top up", "fas fa-piggy-bank", "/student/payment"),
    MenuItem::leaf(
        "Transaction history",
        "fas fa-clock-rotate-left",
        "/student/transaction-histories",
    ),
];

const TEACHER_MENU: &[MenuItem] = &[
    MenuItem::leaf("Dashboard", "fas fa-home", "/teacher/dashboard"),
    MenuItem::leaf(
        "My classes",
        "fas fa-chalkboard-teacher",
        "/teacher/my-classes",
    ),
    MenuItem::leaf(
        "Teaching schedule",
        "fas fa-tasks",
        "/teacher/teaching-schedule",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wire_names() {
        assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("TEACHER".parse::<Role>(), Ok(Role::Teacher));
        assert_eq!("STUDENT".parse::<Role>(), Ok(Role::Student));
        assert_eq!(
            "admin".parse::<Role>(),
            Err(UnknownRole("admin".to_string()))
        );
    }

    #[test]
    fn test_serde_uses_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Teacher).unwrap(), "\"TEACHER\"");
        let role: Role = serde_json::from_str("\"STUDENT\"").unwrap();
        assert_eq!(role, Role::Student);
    }

    #[test]
    fn test_every_menu_path_stays_in_role_area() {
        for role in Role::ALL {
            for item in role.navigation().iter().flat_map(MenuItem::walk) {
                assert!(
                    role.owns_path(item.path),
                    "{role} menu links outside its area: {}",
                    item.path
                );
            }
        }
    }

    #[test]
    fn test_menu_starts_with_home() {
        for role in Role::ALL {
            assert_eq!(role.navigation()[0].path, role.home_path());
        }
    }

    #[test]
    fn test_admin_users_menu_has_children() {
        let users = Role::Admin
            .navigation()
            .iter()
            .find(|i| i.path == "/admin/users")
            .unwrap();
        assert_eq!(users.children.len(), 3);
        assert_eq!(users.walk().len(), 4);
    }

    #[test]
    fn test_menu_sizes() {
        assert_eq!(Role::Admin.navigation().len(), 9);
        assert_eq!(Role::Student.navigation().len(), 8);
        assert_eq!(Role::Teacher.navigation().len(), 3);
    }
}
