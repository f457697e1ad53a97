use std::{
    env,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    process,
};

use keyflinger::{
    trace::GestureLog, GestureConfig, GestureEngine, TouchAction, TouchSample,
};

/// How long to keep polling timers past the last sample so pending tap
/// confirmations can settle.
const TAIL_MS: u64 = 1_000;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let mut trace_path: Option<PathBuf> = None;
    let mut expect_path: Option<PathBuf> = None;

    let mut idx = 1usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--expect" => {
                idx += 1;
                let Some(path) = args.get(idx) else {
                    return Err("missing path after --expect".into());
                };
                expect_path = Some(PathBuf::from(path));
            }
            "-h" | "--help" => {
                println!("{}", usage());
                return Ok(());
            }
            value if value.starts_with('-') => {
                return Err(format!("unknown argument: {value}"));
            }
            value => {
                if trace_path.is_some() {
                    return Err("multiple trace paths provided".into());
                }
                trace_path = Some(PathBuf::from(value));
            }
        }
        idx += 1;
    }

    let trace_path = trace_path.ok_or_else(usage)?;
    let samples = parse_trace(&trace_path)?;

    let mut engine =
        GestureEngine::with_double_tap(GestureConfig::default(), GestureLog::new(), GestureLog::new())
            .map_err(|err| format!("engine construction failed: {err}"))?;

    let mut last_ms = 0u64;
    for sample in &samples {
        engine.poll_timers(sample.t_ms);
        engine.handle(*sample);
        last_ms = last_ms.max(sample.t_ms);
    }
    // Flush timers that come due after the last captured sample, so pending
    // tap confirmations and long presses still land.
    engine.poll_timers(last_ms + TAIL_MS);

    let mut all_lines: Vec<String> = Vec::new();

    println!("GESTURE_REPLAY BEGIN samples={}", samples.len());
    for line in engine.listener().lines() {
        println!("{line}");
        all_lines.push(line.as_str().to_owned());
    }
    if let Some(secondary) = engine.double_tap_listener() {
        for line in secondary.lines() {
            println!("{line}");
            all_lines.push(line.as_str().to_owned());
        }
    }
    println!("GESTURE_REPLAY END");

    if let Some(expect_path) = expect_path {
        diff_expectations(&expect_path, &all_lines)?;
        println!("expectations matched");
    }

    Ok(())
}

fn usage() -> String {
    "usage: gesture_replay <trace.csv> [--expect <expected.csv>]\n\
     trace lines: touch_sample,<ms>,<action>,<pointer_id>,<pointer_index>,<x>,<y>"
        .to_string()
}

fn parse_trace(path: &Path) -> Result<Vec<TouchSample>, String> {
    let file = File::open(path).map_err(|err| format!("cannot open {}: {err}", path.display()))?;
    let mut samples = Vec::new();

    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|err| format!("read failed at line {}: {err}", number + 1))?;
        let line = line.trim();
        if line.is_empty() || !line.starts_with("touch_sample,") {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 7 {
            return Err(format!("line {}: expected 7 fields", number + 1));
        }
        let t_ms = parse_number(fields[1], number)?;
        let action = parse_action(fields[2], number)?;
        let pointer_id = parse_number(fields[3], number)?;
        let pointer_index = parse_number(fields[4], number)?;
        let x = parse_number(fields[5], number)?;
        let y = parse_number(fields[6], number)?;
        samples.push(TouchSample {
            pointer_id,
            pointer_index,
            x,
            y,
            t_ms,
            action,
        });
    }

    if samples.is_empty() {
        return Err("trace contains no touch_sample lines".into());
    }
    Ok(samples)
}

fn parse_number<T: std::str::FromStr>(field: &str, line_number: usize) -> Result<T, String> {
    field
        .parse()
        .map_err(|_| format!("line {}: bad field {field:?}", line_number + 1))
}

fn parse_action(label: &str, line_number: usize) -> Result<TouchAction, String> {
    match label {
        "down" => Ok(TouchAction::Down),
        "move" => Ok(TouchAction::Move),
        "up" => Ok(TouchAction::Up),
        "pointer_down" => Ok(TouchAction::PointerDown),
        "pointer_up" => Ok(TouchAction::PointerUp),
        "cancel" => Ok(TouchAction::Cancel),
        other => Err(format!("line {}: unknown action {other:?}", line_number + 1)),
    }
}

fn diff_expectations(path: &Path, actual: &[String]) -> Result<(), String> {
    let file = File::open(path).map_err(|err| format!("cannot open {}: {err}", path.display()))?;
    let expected: Vec<String> = BufReader::new(file)
        .lines()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| format!("read failed: {err}"))?
        .into_iter()
        .map(|line| line.trim().to_owned())
        .filter(|line| !line.is_empty())
        .collect();

    for (index, expected_line) in expected.iter().enumerate() {
        match actual.get(index) {
            Some(actual_line) if actual_line == expected_line => {}
            Some(actual_line) => {
                return Err(format!(
                    "mismatch at gesture {}: expected {expected_line:?}, got {actual_line:?}",
                    index + 1
                ));
            }
            None => {
                return Err(format!(
                    "missing gesture {}: expected {expected_line:?}",
                    index + 1
                ));
            }
        }
    }
    if actual.len() > expected.len() {
        return Err(format!(
            "unexpected extra gesture: {:?}",
            actual[expected.len()]
        ));
    }
    Ok(())
}
