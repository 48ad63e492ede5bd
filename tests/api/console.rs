use crate::helpers::spawn_app;
use serde_json::Value;
use signup_flow::commands::run_console;

async fn run_script(script: &str) -> Vec<Value> {
    let app = spawn_app();
    let mut output: Vec<u8> = vec![];
    run_console(app.form(), script.as_bytes(), &mut output)
        .await
        .expect("Console run failed");
    String::from_utf8(output)
        .expect("Console output is not UTF-8")
        .lines()
        .map(|line| serde_json::from_str(line).expect("Console output is not JSON"))
        .collect()
}

fn events_named<'a>(events: &'a [Value], name: &str) -> Vec<&'a Value> {
    events.iter().filter(|e| e["event"] == name).collect()
}

#[tokio::test]
async fn console_script_registers_a_phone_number() {
    let script = "\
type phone
contact +1 234 567 8901
password Abcd123!
confirm Abcd123!
terms on
human on
submit
digit 0 1
digit 1 2
digit 2 3
digit 3 4
digit 4 5
digit 5 6
verify
quit
show
";
    let events = run_script(script).await;

    let requested = events_named(&events, "otpRequested");
    assert_eq!(requested.len(), 1);
    assert_eq!(requested[0]["destination"]["value"], "+12345678901");

    let focus: Vec<u64> = events_named(&events, "focus")
        .iter()
        .filter_map(|e| e["slot"].as_u64())
        .collect();
    assert_eq!(focus, vec![1, 2, 3, 4, 5]);

    assert_eq!(events_named(&events, "verified").len(), 1);
    let last = events.last().expect("No output");
    assert_eq!(last["event"], "state");
    assert_eq!(last["phase"], "verified");
}

#[tokio::test]
async fn console_reports_validation_errors_and_bad_commands() {
    let events = run_script("submit\nfly away\ndigit 0 1\n").await;

    let errors = events_named(&events, "error");
    assert_eq!(errors.len(), 3);
    assert_eq!(errors[1]["message"], "Unknown command: fly");
    assert_eq!(
        errors[2]["message"],
        "No verification code has been requested"
    );

    let state = events_named(&events, "state")[0];
    assert_eq!(state["phase"], "idle");
    assert_eq!(state["errors"]["contact"], "Email is required");
    assert_eq!(state["errors"]["acceptTerms"], "You must accept the Terms & Conditions");
    assert_eq!(state["contactLabel"], "Email Address");
}
