//! Fixed seed projects used when no persisted list exists.

use crate::model::project::{IconType, Project, ProjectStatus, TeamMember};

/// Returns the five built-in projects, ids 1 through 5, in display order.
pub fn seed_projects() -> Vec<Project> {
    vec![
        Project {
            id: 1,
            title: "Fintech Mobile App UI".to_string(),
            date: "20 July".to_string(),
            description: "Fintech app development provides more freedom to banking and other financial institutions.".to_string(),
            hours: "91 hours".to_string(),
            team_members: vec![
                TeamMember::new("John Doe", 0),
                TeamMember::new("Sarah Smith", 1),
                TeamMember::new("Mike Johnson", 2),
                TeamMember::new("Emily Davis", 3),
                TeamMember::new("Alex Brown", 4),
            ],
            icon_type: IconType::Fintech,
            background_color: "#F8E9C8".to_string(),
            status: ProjectStatus::Active,
        },
        Project {
            id: 2,
            title: "Green sky Website Design".to_string(),
            date: "12 June".to_string(),
            description: "Website redesign for Green sky environmental services.".to_string(),
            hours: "64 hours".to_string(),
            team_members: vec![
                TeamMember::new("Lisa Wilson", 5),
                TeamMember::new("Tom Anderson", 6),
                TeamMember::new("Kate Miller", 7),
            ],
            icon_type: IconType::Website,
            background_color: "#DEECEC".to_string(),
            status: ProjectStatus::Active,
        },
        Project {
            id: 3,
            title: "E-commerce Mobile App".to_string(),
            date: "15 August".to_string(),
            description: "Building a modern e-commerce platform with seamless checkout experience.".to_string(),
            hours: "120 hours".to_string(),
            team_members: vec![
                TeamMember::new("John Doe", 0),
                TeamMember::new("Emily Davis", 3),
                TeamMember::new("Tom Anderson", 6),
            ],
            icon_type: IconType::Mobile,
            background_color: "#DED3FD".to_string(),
            status: ProjectStatus::Active,
        },
        Project {
            id: 4,
            title: "Brand Identity Design".to_string(),
            date: "5 September".to_string(),
            description: "Complete brand identity package including logo, colors, and guidelines.".to_string(),
            hours: "45 hours".to_string(),
            team_members: vec![
                TeamMember::new("Sarah Smith", 1),
                TeamMember::new("Kate Miller", 7),
            ],
            icon_type: IconType::Design,
            background_color: "#DFECDE".to_string(),
            status: ProjectStatus::Completed,
        },
        Project {
            id: 5,
            title: "Healthcare Dashboard".to_string(),
            date: "22 July".to_string(),
            description: "Analytics dashboard for healthcare providers to track patient data.".to_string(),
            hours: "88 hours".to_string(),
            team_members: vec![
                TeamMember::new("Mike Johnson", 2),
                TeamMember::new("Alex Brown", 4),
                TeamMember::new("Lisa Wilson", 5),
            ],
            icon_type: IconType::Website,
            background_color: "#DEECEC".to_string(),
            status: ProjectStatus::OnHold,
        },
    ]
}
