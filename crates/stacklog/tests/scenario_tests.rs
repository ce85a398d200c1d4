use stacklog::{ActionKind, EditEvent, Events, ReconstructError, Reconstructor, TextSpan};

fn tuple(event: &EditEvent) -> (bool, (i32, i32), (i32, i32), &str) {
    let span = event.span;
    (
        event.undo(),
        (span.start.row, span.start.col),
        (span.end.row, span.end.col),
        event.word.as_str(),
    )
}

#[test]
fn test_single_redo_append() {
    let run = Reconstructor::new()
        .parse("STACK_APPEND(1:REDO x:(0,0):(0,3) - junk:abc:\"foo\"\n")
        .unwrap();
    assert_eq!(run.events.len(), 1);
    assert_eq!(tuple(&run.events[0].edit), (false, (0, 0), (0, 3), "foo"));
}

#[test]
fn test_append_then_edit() {
    let input = "STACK_APPEND(1:UNDO x:(1,1):(1,5) - junk:abc:\"bar\"\n\
STACK_EDIT(2:REDO x:(2,2):(2,9) - junk:abc:\"baz\"\n";
    let run = Reconstructor::new().parse(input).unwrap();

    assert_eq!(run.events.len(), 2);
    assert_eq!(tuple(&run.events[0].edit), (true, (1, 1), (1, 5), "bar"));
    assert_eq!(tuple(&run.events[1].edit), (false, (2, 2), (2, 9), "baz"));

    // The EDIT's raw text lands on the APPEND's slot.
    assert_eq!(run.events[1].target, 0);
    assert_eq!(
        run.annotations.get(0),
        Some("STACK_EDIT(2:REDO x:(2,2):(2,9) - junk:abc:\"baz\"")
    );
    assert_eq!(run.annotations.get(1), None);
}

#[test]
fn test_non_record_line() {
    let run = Reconstructor::new().parse("NOTICE: server started\n").unwrap();
    assert!(run.events.is_empty());
    assert!(run.annotations.is_empty());
}

#[test]
fn test_malformed_action_is_fatal() {
    let lines = [
        "STACK_APPEND(1:MAYBE x:(0,0):(0,3) - junk:\"foo\"\n",
        "STACK_APPEND(2:UNDO x:(0,0):(0,3) - junk:\"foo\"\n",
    ];
    let results: Vec<_> = Events::new(lines).collect();
    assert_eq!(results.len(), 1);
    assert!(matches!(
        results[0],
        Err(ReconstructError::MalformedAction { line: 0, .. })
    ));
}

#[test]
fn test_empty_input() {
    let empty: [&str; 0] = [];
    let results: Vec<_> = Events::new(empty).collect();
    assert_eq!(results, vec![Err(ReconstructError::EmptyInput)]);

    assert_eq!(
        Reconstructor::new().parse(""),
        Err(ReconstructError::EmptyInput)
    );
}

#[test]
fn test_events_keep_source_order() {
    let input = "\
boot
STACK_APPEND(UNDO a:(0,0):(0,1) - j:\"a\"
noise
STACK_EDIT(REDO b:(0,1):(0,2) - j:\"b\"
STACK_APPEND(REDO c:(1,0):(1,1) - j:\"c\"
more noise
STACK_EDIT(UNDO d:(1,1):(1,2) - j:\"d\"
";
    let run = Reconstructor::new().parse(input).unwrap();
    let lines: Vec<_> = run.events.iter().map(|e| e.line).collect();
    assert_eq!(lines, vec![1, 3, 4, 6]);
    assert!(lines.windows(2).all(|w| w[0] < w[1]));

    let words: Vec<_> = run.events.iter().map(|e| e.edit.word.as_str()).collect();
    assert_eq!(words, vec!["a", "b", "c", "d"]);
}

#[test]
fn test_consecutive_edits_share_target() {
    let mut input = String::from("header\nSTACK_APPEND(UNDO a:(0,0):(0,1) - j:\"w\"\n");
    for i in 0..5 {
        input.push_str(&format!("STACK_EDIT(REDO e:({i},0):({i},1) - j:\"e{i}\"\n"));
    }
    let run = Reconstructor::new().parse(&input).unwrap();

    assert_eq!(run.events.len(), 6);
    assert!(run.events.iter().all(|e| e.target == 1));
    assert_eq!(
        run.annotations.get(1),
        Some("STACK_EDIT(REDO e:(4,0):(4,1) - j:\"e4\"")
    );
    assert_eq!(run.annotations.len(), 1);
}

#[test]
fn test_new_append_moves_correlation() {
    let input = "STACK_APPEND(UNDO a:(0,0):(0,1) - j:\"a\"\n\
STACK_EDIT(REDO b:(0,0):(0,1) - j:\"b\"\n\
STACK_APPEND(UNDO c:(0,0):(0,1) - j:\"c\"\n\
STACK_EDIT(REDO d:(0,0):(0,1) - j:\"d\"\n";
    let run = Reconstructor::new().parse(input).unwrap();
    let targets: Vec<_> = run.events.iter().map(|e| e.target).collect();
    assert_eq!(targets, vec![0, 0, 2, 2]);
}

#[test]
fn test_rendered_events_reparse() {
    let input = "STACK_APPEND(UNDO a:(1,2):(3,4) - j:\"cat\"\n\
STACK_EDIT(REDO b:(10,0):(12,7) - j:\"two words, here\"\n";
    let run = Reconstructor::new().parse(input).unwrap();
    for event in &run.events {
        let reparsed: EditEvent = event.edit.to_string().parse().unwrap();
        assert_eq!(reparsed, event.edit);
    }
    assert_eq!(
        run.events[0].edit,
        EditEvent::new(ActionKind::Undo, TextSpan::new((1, 2), (3, 4)), "cat")
    );
}

#[test]
fn test_malformed_field_stops_run() {
    let input = "STACK_APPEND(UNDO a:(0,0):(0,1) - j:\"a\"\n\
STACK_EDIT(REDO b:(0,0),(0,1) - j:\"b\"\n\
STACK_APPEND(UNDO c:(0,0):(0,1) - j:\"c\"\n";
    let results: Vec<_> = Events::new(input.lines()).collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(ReconstructError::MalformedField { line: 1, .. })
    ));
}

#[test]
fn test_action_followed_by_any_delimiter() {
    let input = "STACK_APPEND(UNDO_x:(0,0):(0,3) - j:\"w\"\n\
STACK_EDIT(REDO|x:(1,0):(1,3) - j:\"v\"\n\
STACK_APPEND(UNDO1x:(2,0):(2,3) - j:\"u\"\n\
STACK_EDIT(12ab:REDO/x:(3,0):(3,3) - j:\"t\"\n";
    let run = Reconstructor::new().parse(input).unwrap();
    let rendered: Vec<_> = run.events.iter().map(|e| e.edit.to_string()).collect();
    assert_eq!(
        rendered,
        vec![
            "true, (0, 0), (0, 3), w",
            "false, (1, 0), (1, 3), v",
            "true, (2, 0), (2, 3), u",
            "false, (3, 0), (3, 3), t",
        ]
    );
    let targets: Vec<_> = run.events.iter().map(|e| e.target).collect();
    assert_eq!(targets, vec![0, 0, 2, 2]);
}
