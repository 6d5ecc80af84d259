use habitledger_core::{
    GoalType, Habit, HabitChanges, HabitEvent, HabitTransitionError, HabitValidationError,
    NewHabit, MS_PER_DAY,
};
use uuid::Uuid;

fn new_request() -> NewHabit {
    NewHabit {
        name: "morning run".to_string(),
        description: "5k before work".to_string(),
        emoji: "🏃".to_string(),
        goal_type: 0,
        goal_count: 1,
        is_public: true,
    }
}

fn created_habit() -> Habit {
    let (habit, _) = Habit::create(Uuid::new_v4(), Uuid::new_v4(), new_request(), 1_000).unwrap();
    habit
}

#[test]
fn create_sets_defaults_and_emits_created_event() {
    let id = Uuid::new_v4();
    let caller = Uuid::new_v4();
    let (habit, events) = Habit::create(id, caller, new_request(), 42).unwrap();

    assert_eq!(habit.id, id);
    assert_eq!(habit.owner, caller);
    assert_eq!(habit.created_at, 42);
    assert_eq!(habit.goal_type, GoalType::Daily);
    assert_eq!(habit.goal_count, 1);
    assert_eq!(habit.total_checkins, 0);
    assert_eq!(habit.current_streak, 0);
    assert_eq!(habit.longest_streak, 0);
    assert_eq!(habit.last_checkin_date, None);
    assert!(habit.is_public);

    assert_eq!(
        events,
        vec![HabitEvent::HabitCreated {
            habit_id: id,
            owner: caller,
            name: "morning run".to_string(),
        }]
    );
}

#[test]
fn create_rejects_goal_type_code_above_two() {
    let mut request = new_request();
    request.goal_type = 3;

    let err = Habit::create(Uuid::new_v4(), Uuid::new_v4(), request, 0).unwrap_err();
    assert_eq!(err, HabitTransitionError::InvalidGoalType { code: 3 });
}

#[test]
fn create_accepts_goal_count_zero() {
    // goal_count == 0 is never rejected; the completion rate guards the
    // division instead.
    let mut request = new_request();
    request.goal_count = 0;

    let (habit, _) = Habit::create(Uuid::new_v4(), Uuid::new_v4(), request, 0).unwrap();
    assert_eq!(habit.goal_count, 0);
    assert_eq!(habit.completion_rate(30), 0);
}

#[test]
fn goal_type_codes_roundtrip_and_reject_out_of_range() {
    assert_eq!(GoalType::from_code(0), Some(GoalType::Daily));
    assert_eq!(GoalType::from_code(1), Some(GoalType::Weekly));
    assert_eq!(GoalType::from_code(2), Some(GoalType::Monthly));
    assert_eq!(GoalType::from_code(3), None);
    assert_eq!(GoalType::from_code(255), None);

    for code in 0..=2u8 {
        assert_eq!(GoalType::from_code(code).unwrap().code(), code);
    }
}

#[test]
fn habit_serialization_uses_expected_wire_fields() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let owner = Uuid::parse_str("99999999-8888-4777-8666-555555555555").unwrap();
    let (mut habit, _) = Habit::create(id, owner, new_request(), 1_700_000_000_000).unwrap();
    habit.last_checkin_date = Some(MS_PER_DAY);
    habit.current_streak = 1;
    habit.longest_streak = 2;
    habit.total_checkins = 3;

    let json = serde_json::to_value(&habit).unwrap();
    assert_eq!(json["id"], id.to_string());
    assert_eq!(json["owner"], owner.to_string());
    assert_eq!(json["name"], "morning run");
    assert_eq!(json["goal_type"], "daily");
    assert_eq!(json["goal_count"], 1);
    assert_eq!(json["created_at"], 1_700_000_000_000_i64);
    assert_eq!(json["last_checkin_date"], MS_PER_DAY);
    assert_eq!(json["is_public"], true);

    let decoded: Habit = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, habit);
}

#[test]
fn event_serialization_carries_kind_discriminator() {
    let habit_id = Uuid::new_v4();
    let event = HabitEvent::StreakBroken {
        habit_id,
        previous_streak: 7,
    };

    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["event"], "streak_broken");
    assert_eq!(json["previous_streak"], 7);
    assert_eq!(json["habit_id"], habit_id.to_string());
    assert_eq!(event.kind(), "streak_broken");
    assert_eq!(event.habit_id(), habit_id);
}

#[test]
fn validate_rejects_streak_above_longest() {
    let mut habit = created_habit();
    habit.current_streak = 5;
    habit.longest_streak = 3;

    let err = habit.validate().unwrap_err();
    assert_eq!(
        err,
        HabitValidationError::StreakAboveLongest {
            current: 5,
            longest: 3,
        }
    );
}

#[test]
fn validate_rejects_misaligned_last_checkin_date() {
    let mut habit = created_habit();
    habit.last_checkin_date = Some(MS_PER_DAY + 1);

    let err = habit.validate().unwrap_err();
    assert_eq!(
        err,
        HabitValidationError::MisalignedCheckinDate {
            value: MS_PER_DAY + 1,
        }
    );
}

#[test]
fn update_from_owner_applies_only_supplied_fields() {
    let mut habit = created_habit();
    let owner = habit.owner;

    let events = habit
        .apply_update(
            owner,
            HabitChanges {
                name: Some("evening run".to_string()),
                goal_type: Some(1),
                ..HabitChanges::default()
            },
        )
        .unwrap();

    assert_eq!(habit.name, "evening run");
    assert_eq!(habit.goal_type, GoalType::Weekly);
    // Omitted fields stay untouched.
    assert_eq!(habit.description, "5k before work");
    assert_eq!(habit.goal_count, 1);
    assert!(habit.is_public);

    assert_eq!(events, vec![HabitEvent::HabitUpdated { habit_id: habit.id }]);
}

#[test]
fn update_emits_event_even_when_nothing_changes() {
    let mut habit = created_habit();
    let owner = habit.owner;

    let events = habit.apply_update(owner, HabitChanges::default()).unwrap();
    assert_eq!(events, vec![HabitEvent::HabitUpdated { habit_id: habit.id }]);
}

#[test]
fn update_from_non_owner_is_rejected_without_partial_application() {
    let mut habit = created_habit();
    let before = habit.clone();
    let stranger = Uuid::new_v4();

    let err = habit
        .apply_update(
            stranger,
            HabitChanges {
                name: Some("hijacked".to_string()),
                ..HabitChanges::default()
            },
        )
        .unwrap_err();

    assert_eq!(
        err,
        HabitTransitionError::NotOwner {
            habit_id: habit.id,
            caller: stranger,
        }
    );
    assert_eq!(habit, before);
}

#[test]
fn update_validates_all_fields_before_applying_any() {
    // A bad goal_type must not leave the earlier name field applied.
    let mut habit = created_habit();
    let before = habit.clone();
    let owner = habit.owner;

    let err = habit
        .apply_update(
            owner,
            HabitChanges {
                name: Some("should not stick".to_string()),
                goal_type: Some(9),
                ..HabitChanges::default()
            },
        )
        .unwrap_err();

    assert_eq!(err, HabitTransitionError::InvalidGoalType { code: 9 });
    assert_eq!(habit, before);
}

#[test]
fn delete_is_owner_gated_and_emits_deleted_event() {
    let habit = created_habit();
    let stranger = Uuid::new_v4();

    let err = habit.delete(stranger).unwrap_err();
    assert_eq!(
        err,
        HabitTransitionError::NotOwner {
            habit_id: habit.id,
            caller: stranger,
        }
    );

    let events = habit.delete(habit.owner).unwrap();
    assert_eq!(events, vec![HabitEvent::HabitDeleted { habit_id: habit.id }]);
}

#[test]
fn info_projects_every_field_except_last_checkin_date() {
    let mut habit = created_habit();
    habit.last_checkin_date = Some(MS_PER_DAY);
    habit.current_streak = 1;
    habit.longest_streak = 4;
    habit.total_checkins = 9;

    let info = habit.info();
    assert_eq!(info.id, habit.id);
    assert_eq!(info.owner, habit.owner);
    assert_eq!(info.name, habit.name);
    assert_eq!(info.description, habit.description);
    assert_eq!(info.emoji, habit.emoji);
    assert_eq!(info.created_at, habit.created_at);
    assert_eq!(info.goal_type, habit.goal_type);
    assert_eq!(info.goal_count, habit.goal_count);
    assert_eq!(info.total_checkins, 9);
    assert_eq!(info.current_streak, 1);
    assert_eq!(info.longest_streak, 4);
    assert_eq!(info.is_public, habit.is_public);

    let json = serde_json::to_value(&info).unwrap();
    assert!(json.get("last_checkin_date").is_none());
}
