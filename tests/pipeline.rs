//! End-to-end runs against the CP-SAT engine.

use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

use chrono::{NaiveTime, Weekday};
use timetable_core::catalog::{
    ElectiveChoice, Instructor, Room, RoomType, Student, Subject, SubjectType,
    TimeSlot,
};
use timetable_core::{
    Catalog, ConfigurationError, CpSatEngine, ErrorKind, ScheduleError, SchedulerConfig,
    build_sessions, generate_timetable, plan,
};

const MATHS: u32 = 1;
const PHYSICS: u32 = 2;
const AI: u32 = 10;
const ROBOTICS: u32 = 11;
const ECONOMICS: u32 = 20;

fn subject(id: u32, name: &str, subject_type: SubjectType, requires_lab: bool) -> Subject {
    Subject {
        id,
        name: name.into(),
        subject_type,
        requires_lab,
    }
}

fn room(id: u32, number: &str, room_type: &str, capacity: u32) -> Room {
    Room {
        id,
        number: number.into(),
        room_type: RoomType::parse(room_type),
        capacity,
    }
}

fn instructor(id: u32, name: &str, subjects: &[u32]) -> Instructor {
    Instructor {
        id,
        name: name.into(),
        subjects: subjects.iter().copied().collect::<BTreeSet<_>>(),
    }
}

fn slots(count: u32) -> Vec<TimeSlot> {
    (0..count)
        .map(|i| TimeSlot {
            id: i + 1,
            day: Weekday::Mon,
            start: NaiveTime::from_hms_opt(8 + i, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(9 + i, 0, 0).unwrap(),
        })
        .collect()
}

/// 25 students in one division: odd ids take AI (with a lab), even ids take
/// Robotics, everyone takes Economics. Physics is a core lab.
///
/// Batches: A1 = the 13 AI students, A2 = the 12 Robotics students.
/// Sessions: Maths, AI, Robotics and Economics lectures; AI lab for A1 and a
/// Physics lab for each batch.
fn catalog(slot_count: u32) -> Catalog {
    let mut choices = Vec::new();
    for student in 1..=25 {
        let pe = if student % 2 == 1 { AI } else { ROBOTICS };
        choices.push(ElectiveChoice { student, subject: pe });
        choices.push(ElectiveChoice { student, subject: ECONOMICS });
    }

    Catalog {
        students: (1..=25)
            .map(|id| Student {
                id,
                enrollment_no: format!("22CE{id:03}"),
                name: format!("Student {id}"),
            })
            .collect(),
        subjects: vec![
            subject(MATHS, "Maths", SubjectType::Core, false),
            subject(PHYSICS, "Physics", SubjectType::Core, true),
            subject(AI, "AI", SubjectType::ProfessionalElective, true),
            subject(ROBOTICS, "Robotics", SubjectType::ProfessionalElective, false),
            subject(ECONOMICS, "Economics", SubjectType::OpenElective, false),
        ],
        rooms: vec![
            room(1, "LH-101", "Lecture Hall", 30),
            room(2, "LAB-1", "Lab", 20),
            room(3, "Staff Room", "Office", 8),
        ],
        instructors: vec![
            instructor(1, "Dr. Iyer", &[MATHS, PHYSICS]),
            instructor(2, "Dr. Sen", &[AI, ROBOTICS, ECONOMICS]),
        ],
        slots: slots(slot_count),
        choices,
    }
}

fn config() -> SchedulerConfig {
    SchedulerConfig::default()
        .with_time_limit(Duration::from_secs(30))
        .with_random_seed(7)
}

#[test]
fn generates_clash_free_timetable() {
    let catalog = catalog(6);
    let config = config();
    let run = generate_timetable(&catalog, &config, &CpSatEngine::new(&config)).unwrap();

    assert_eq!(run.plan.divisions.len(), 1);
    assert_eq!(run.plan.batch_count(), 2);
    assert_eq!(run.sessions.len(), 7);
    assert_eq!(run.timetable.len(), 7);

    let placed: HashSet<usize> = run.assignments.iter().map(|a| a.session).collect();
    assert_eq!(placed.len(), run.sessions.len());

    let mut rooms = HashSet::new();
    let mut instructors = HashSet::new();
    let mut students = HashSet::new();
    for a in &run.assignments {
        assert!(rooms.insert((a.room, a.slot)), "room double-booked");
        assert!(instructors.insert((a.instructor, a.slot)), "instructor double-booked");
        for &s in &run.sessions[a.session].students {
            assert!(students.insert((s, a.slot)), "student {s} double-booked");
        }

        let session = &run.sessions[a.session];
        let room = catalog.room(a.room).unwrap();
        assert!(room.fits(session.room_category, session.group_size()));
        assert!(catalog.instructor(a.instructor).unwrap().can_teach(session.subject));
    }

    let views = run.timetable.flatten(&catalog);
    assert!(views.iter().all(|v| v.room_number != "Staff Room"));
    assert!(views.iter().any(|v| v.group_name == "Batch A1 (AI PE Lab)"));
    assert!(views.iter().all(|v| v.day_of_week == "Monday"));
}

#[test]
fn subject_without_instructor_fails_before_solving() {
    let mut catalog = catalog(6);
    catalog.instructors[1].subjects.remove(&ROBOTICS);
    let config = config();

    let err = generate_timetable(&catalog, &config, &CpSatEngine::new(&config)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    match err {
        ScheduleError::Configuration(ConfigurationError::NoEligibleInstructor { subject, group }) => {
            assert_eq!(subject, "Robotics");
            assert_eq!(group, "Div-A (Robotics PE Lec)");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn too_few_slots_is_infeasible() {
    // every AI student attends five sessions
    let catalog = catalog(2);
    let config = config();

    let err = generate_timetable(&catalog, &config, &CpSatEngine::new(&config)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Infeasible);
    assert!(!err.is_retryable());
}

#[test]
fn empty_roster_is_rejected() {
    let mut catalog = catalog(6);
    catalog.choices.clear();
    let config = config();

    let err = generate_timetable(&catalog, &config, &CpSatEngine::new(&config)).unwrap_err();
    assert!(matches!(
        err,
        ScheduleError::Configuration(ConfigurationError::NoEnrolledStudents)
    ));
}

#[test]
fn plan_and_sessions_are_deterministic() {
    let catalog = catalog(6);
    let config = config();

    let first = plan(&catalog, &config).unwrap();
    let second = plan(&catalog, &config).unwrap();
    assert_eq!(first, second);

    let sessions = build_sessions(&first.divisions, &catalog).unwrap();
    assert_eq!(sessions, build_sessions(&second.divisions, &catalog).unwrap());
    assert_eq!(sessions[0].group, "Div-A (Maths Lec)");
}

#[test]
fn divisions_follow_largest_lecture_hall() {
    let mut catalog = catalog(6);
    catalog.rooms[0].capacity = 20;

    let plan = plan(&catalog, &config()).unwrap();
    let sizes: Vec<usize> = plan.divisions.iter().map(|d| d.students.len()).collect();
    assert_eq!(sizes, vec![13, 12]);
    assert_eq!(plan.params.max_lecture_capacity, 20);
    assert_eq!(plan.divisions[1].batches[0].name, "B1");
}
