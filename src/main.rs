mod utils;
mod logger;
mod clicks;
mod gsp;
mod history;
mod slots;
mod agent_strategies;
mod agents;
mod game;
mod scenarios;
mod charts;

use logger::{Logger, LogEvent, ConsoleReceiver, FileReceiver, sanitize_filename};
use std::path::PathBuf;

use scenarios::get_scenario_catalog;
use utils::{RAND_SEED, TOTAL_SIMULATION_RUNS};
use std::sync::atomic::Ordering;

fn main() {
    let raw_args: Vec<String> = std::env::args().collect();

    // Parse and filter out --verbose and --fastbreak arguments
    let mut args = Vec::new();
    let mut skip_next = false;
    let mut fastbreak = false;
    for (i, arg) in raw_args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--verbose" {
            if i + 1 < raw_args.len() && raw_args[i + 1] == "auction" {
                utils::VERBOSE_AUCTION.store(true, Ordering::Relaxed);
                skip_next = true;
            }
            continue;
        }
        if arg == "--fastbreak" {
            fastbreak = true;
            continue;
        }
        args.push(arg.clone());
    }

    if args.len() > 1 && args[1] == "charts" {
        match charts::generate_all_charts() {
            Ok(()) => {
                println!("Chart generation completed successfully.");
            }
            Err(e) => {
                eprintln!("Error generating charts: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    if args.len() <= 1 {
        // Default: one budget pacing run with round and game output on the console
        let mut logger = Logger::new();
        logger.add_receiver(ConsoleReceiver::new(vec![LogEvent::Round, LogEvent::Game, LogEvent::Scenario]));
        if utils::VERBOSE_AUCTION.load(Ordering::Relaxed) {
            logger.add_receiver(ConsoleReceiver::new(vec![LogEvent::Auction]));
        }
        if let Err(e) = scenarios::budget_pacing::run("budget_pacing", &mut logger) {
            eprintln!("Error running scenario: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let scenario_arg = &args[1];

    let iterations = if args.len() > 2 {
        match args[2].parse::<u64>() {
            Ok(n) => n,
            Err(_) => {
                eprintln!("Error: Invalid iterations parameter '{}'. Expected a number.", args[2]);
                std::process::exit(1);
            }
        }
    } else {
        1
    };

    let start_iteration = if args.len() > 3 {
        match args[3].parse::<u64>() {
            Ok(n) => n,
            Err(_) => {
                eprintln!("Error: Invalid start iteration parameter '{}'. Expected a number.", args[3]);
                std::process::exit(1);
            }
        }
    } else {
        0
    };

    let all_scenarios = get_scenario_catalog();

    let scenarios: Vec<_> = if scenario_arg == "all" {
        all_scenarios.clone()
    } else {
        match all_scenarios.iter().find(|s| s.short_name == scenario_arg) {
            Some(scenario) => vec![scenario.clone()],
            None => {
                eprintln!("Error: Scenario '{}' not found.", scenario_arg);
                eprintln!("Available scenarios:");
                for s in &all_scenarios {
                    eprintln!("  - {}", s.short_name);
                }
                std::process::exit(1);
            }
        }
    };

    // Scenario checks are only shown on the console for a single named run
    let mut logger = Logger::new();
    if scenario_arg != "all" && iterations == 1 {
        logger.add_receiver(ConsoleReceiver::new(vec![LogEvent::Validation, LogEvent::Scenario]));
    } else {
        logger.add_receiver(ConsoleReceiver::new(vec![LogEvent::Validation]));
    }
    if utils::VERBOSE_AUCTION.load(Ordering::Relaxed) {
        match FileReceiver::new(&PathBuf::from("log/auctions.csv"), vec![LogEvent::Auction]) {
            Ok(receiver) => {
                logger.add_receiver(receiver);
            }
            Err(e) => eprintln!("Warning: cannot open auction log: {}", e),
        }
    }

    let summary_receiver_id = match FileReceiver::new(&PathBuf::from("log/summary.log"), vec![LogEvent::Validation]) {
        Ok(receiver) => Some(logger.add_receiver(receiver)),
        Err(e) => {
            eprintln!("Warning: cannot open summary log: {}", e);
            None
        }
    };

    TOTAL_SIMULATION_RUNS.store(0, Ordering::Relaxed);

    if iterations > 1 {
        logln!(&mut logger, LogEvent::Validation, "Running '{}' {} times...\n", scenario_arg, iterations);
    } else {
        logln!(&mut logger, LogEvent::Validation, "Running '{}'...\n", scenario_arg);
    }

    'scenarios: for scenario in &scenarios {
        log!(&mut logger, LogEvent::Validation, "{}: ", scenario.short_name);

        let scenario_receiver_id = match FileReceiver::new(&PathBuf::from(format!("log/{}/scenario.log", sanitize_filename(scenario.short_name))), vec![LogEvent::Scenario]) {
            Ok(receiver) => Some(logger.add_receiver(receiver)),
            Err(e) => {
                eprintln!("Warning: cannot open scenario log: {}", e);
                None
            }
        };

        for i in start_iteration..(start_iteration + iterations) {
            if iterations > 1 {
                log!(&mut logger, LogEvent::Validation, "[{}/{}] ", i - start_iteration + 1, iterations);
            }

            RAND_SEED.store(i, Ordering::Relaxed);

            match (scenario.run)(scenario.short_name, &mut logger) {
                Ok(()) => {
                    if iterations > 1 {
                        logln!(&mut logger, LogEvent::Validation, "✓");
                    } else {
                        logln!(&mut logger, LogEvent::Validation, "✓ PASSED");
                    }
                }
                Err(e) => {
                    if iterations > 1 {
                        logln!(&mut logger, LogEvent::Validation, "✗");
                    } else {
                        logln!(&mut logger, LogEvent::Validation, "✗ FAILED: {}", e);
                    }

                    if fastbreak {
                        if let Some(id) = scenario_receiver_id {
                            logger.remove_receiver(id);
                        }
                        logln!(&mut logger, LogEvent::Validation, "\nStopping scenario execution due to failure (--fastbreak enabled)");
                        logln!(&mut logger, LogEvent::Validation, "Error at iteration {}/{} (seed {}): {}", i - start_iteration + 1, iterations, i, e);
                        break 'scenarios;
                    }
                }
            }

            let _ = logger.flush();
        }

        if let Some(id) = scenario_receiver_id {
            logger.remove_receiver(id);
        }
    }

    let final_count = TOTAL_SIMULATION_RUNS.load(Ordering::Relaxed);
    logln!(&mut logger, LogEvent::Validation, "\nTotal games played: {}", final_count);

    if let Some(id) = summary_receiver_id {
        logger.remove_receiver(id);
    }
}
