use goaltrack::output::HumanOutput;

#[test]
fn human_output_renders_sections_in_order() {
    let mut human = HumanOutput::new("Task created");
    human.push_summary("ID", "t-01h");
    human.push_summary("Blocked", "");
    human.push_detail("[ ] t-01h Paint walls (blocked by: Buy paint)");
    human.push_warning("event output failed: disk full");
    human.push_next_step("gt task list");

    let rendered = human.to_string();
    assert_eq!(
        rendered,
        "Task created\n\
         \n\
         Summary:\n\
         - ID: t-01h\n\
         - Blocked\n\
         \n\
         Details:\n\
         - [ ] t-01h Paint walls (blocked by: Buy paint)\n\
         \n\
         Warnings:\n\
         - event output failed: disk full\n\
         \n\
         Next steps:\n\
         - gt task list"
    );
}

#[test]
fn human_output_omits_empty_sections() {
    let human = HumanOutput::new("0 goal(s)");
    assert_eq!(human.to_string(), "0 goal(s)");
}
