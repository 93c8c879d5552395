//! Static site content: upcoming events and the skills we teach

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub id: &'static str,
    pub title: &'static str,
    pub date: &'static str,
    pub location: &'static str,
    pub description: &'static str,
    pub image: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skill {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: Option<&'static str>,
}

static EVENTS: &[Event] = &[
    Event {
        id: "spring-open-house",
        title: "Spring Open House",
        date: "2026-03-14",
        location: "Community Learning Center",
        description: "Meet our tutors, tour the classrooms and sign up for the spring term.",
        image: Some("/static/events/open-house.jpg"),
    },
    Event {
        id: "coding-workshop",
        title: "Intro to Coding Workshop",
        date: "2026-04-04",
        location: "Library Annex, Room 2",
        description: "A hands-on afternoon building a first web page. Laptops provided.",
        image: Some("/static/events/coding.jpg"),
    },
    Event {
        id: "reading-marathon",
        title: "Family Reading Marathon",
        date: "2026-05-09",
        location: "Riverside Park Pavilion",
        description: "Read together, earn badges, and take home a free book.",
        image: None,
    },
    Event {
        id: "science-fair",
        title: "Student Science Fair",
        date: "2026-06-06",
        location: "Community Learning Center",
        description: "Students present the projects they built with their tutors this year.",
        image: Some("/static/events/science-fair.jpg"),
    },
];

static SKILLS: &[Skill] = &[
    Skill {
        id: "mathematics",
        title: "Mathematics",
        description: "From arithmetic to algebra, at the student's own pace.",
        icon: Some("∑"),
    },
    Skill {
        id: "reading",
        title: "Reading & Writing",
        description: "Phonics, comprehension and essay writing.",
        icon: Some("✎"),
    },
    Skill {
        id: "science",
        title: "Science",
        description: "Experiments and inquiry-based learning.",
        icon: Some("⚗"),
    },
    Skill {
        id: "coding",
        title: "Coding",
        description: "Block-based programming through first Python projects.",
        icon: Some("⌨"),
    },
    Skill {
        id: "public-speaking",
        title: "Public Speaking",
        description: "Confidence and structure for presentations.",
        icon: None,
    },
];

pub fn events() -> &'static [Event] {
    EVENTS
}

pub fn skills() -> &'static [Skill] {
    SKILLS
}

pub fn find_event(id: &str) -> Option<&'static Event> {
    EVENTS.iter().find(|event| event.id == id)
}
