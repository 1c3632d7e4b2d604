use std::{
    env,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use mealplan_calendar::{
    app::{Direction, MealCalendarViewModel},
    input::command_mode::{parse_command, Command as ShellCommand},
    meal_plan::{MealPlan, MealPlanItem},
    storage::{
        config::{Config, ViewOptions},
        store::{MealPlanStore, NewMealPlanItem},
    },
    ui::month_view::DaySlot,
};

pub const USAGE: &str = "Usage: mealplan-calendar [--month YYYY/MM] [--plan ID] [--import FILE] [--shell]";

const SHELL_HELP: &str = "\
:n / :next          next month
:p / :prev          previous month
:t / :today         back to today
:d N / :day N       select day N (0 = previous month, 32 = next month)
:add MEAL TITLE     schedule TITLE on the selected day
:rm ID              remove an item
:q / :quit          leave";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOptions {
    pub month: Option<NaiveDate>,
    pub plan: Option<String>,
    pub import: Option<PathBuf>,
    pub shell: bool,
}

pub fn parse_cli_options(args: impl IntoIterator<Item = String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--month" => {
                let value = args.next().ok_or("--month requires YYYY/MM")?;
                let month = NaiveDate::parse_from_str(&format!("{value}/01"), "%Y/%m/%d")
                    .map_err(|_| format!("Invalid month '{}'. Use YYYY/MM.", value))?;
                options.month = Some(month);
            }
            "--plan" => {
                options.plan = Some(args.next().ok_or("--plan requires a meal plan id")?);
            }
            "--import" => {
                options.import = Some(PathBuf::from(args.next().ok_or("--import requires a file")?));
            }
            "--shell" => options.shell = true,
            "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            _ => return Err(format!("Unknown argument: {}", arg)),
        }
    }

    Ok(options)
}

pub fn run(options: CliOptions) -> Result<()> {
    let config = Config::load_or_create().context("loading configuration")?;
    let mut store = MealPlanStore::open(&config.storage.database)
        .with_context(|| format!("opening {}", config.storage.database.display()))?;

    let imported = match &options.import {
        Some(path) => Some(import_plan_file(&mut store, path)?),
        None => None,
    };

    let plan_id = match imported.or_else(|| options.plan.clone()) {
        Some(id) => id,
        None => resolve_default_plan(&config, &store)?,
    };

    let mut view = MealCalendarViewModel::for_today();
    if let Some(month) = options.month {
        view = view.with_center(month);
    }

    let plan = reload(&store, &plan_id, &mut view)?;

    if options.shell {
        run_shell(&store, plan, view, &config.view)
    } else {
        display_with_pager(&format_month_text(&view, &plan, &config.view))
    }
}

fn import_plan_file(store: &mut MealPlanStore, path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let plan: MealPlan = serde_json::from_str(&content)
        .with_context(|| format!("parsing meal plan from {}", path.display()))?;
    store.import_plan(&plan)?;
    println!("Imported \"{}\" ({} items)", plan.title, plan.items.len());
    Ok(plan.id)
}

fn resolve_default_plan(config: &Config, store: &MealPlanStore) -> Result<String> {
    if let Some(id) = &config.calendar.default_meal_plan {
        return Ok(id.clone());
    }

    if let Some(plan) = store.list_plans()?.into_iter().next() {
        return Ok(plan.id);
    }

    Ok(store.create_plan("Meal plan")?.id)
}

fn reload(store: &MealPlanStore, plan_id: &str, view: &mut MealCalendarViewModel) -> Result<MealPlan> {
    let plan = store
        .load_plan(plan_id)?
        .with_context(|| format!("meal plan {} not found", plan_id))?;

    let skipped = view.load_meal_plan(&plan.items);
    if skipped > 0 {
        eprintln!("Warning: {} items have an unreadable date and are not shown.", skipped);
    }

    Ok(plan)
}

fn run_shell(
    store: &MealPlanStore,
    mut plan: MealPlan,
    mut view: MealCalendarViewModel,
    options: &ViewOptions,
) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("{}", format_month_text(&view, &plan, options));

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match parse_command(&line) {
            ShellCommand::Quit => break,
            ShellCommand::NextMonth => {
                if !view.navigate(Direction::Forward) {
                    println!("The calendar only reaches 12 months ahead.");
                }
            }
            ShellCommand::PrevMonth => {
                if !view.navigate(Direction::Backward) {
                    println!("Past months can't be planned.");
                }
            }
            ShellCommand::Today => {
                let today = view.today();
                view = view.with_center(today);
            }
            ShellCommand::SelectDay(value) => {
                let slot = DaySlot::from_legacy(value, view.grid().days_in_month());
                view.select_day(slot);
            }
            ShellCommand::AddItem { meal, title } => {
                let new_item = NewMealPlanItem {
                    title,
                    meal,
                    scheduled: view.selected_date().format("%Y-%m-%d").to_string(),
                    recipe_id: None,
                    added_by: env::var("USER").ok(),
                };
                let added = store.add_item(&plan.id, new_item)?;
                println!("Added {} ({})", added.title, added.id);
                plan = reload(store, &plan.id, &mut view)?;
            }
            ShellCommand::RemoveItem(item_id) => {
                if store.remove_item(&plan.id, &item_id)? {
                    plan = reload(store, &plan.id, &mut view)?;
                } else {
                    println!("No item {} in this meal plan.", item_id);
                }
            }
            ShellCommand::Help => {
                println!("{SHELL_HELP}");
                continue;
            }
            ShellCommand::Error(message) => {
                println!("{message}");
                continue;
            }
        }

        println!("{}", format_month_text(&view, &plan, options));
    }

    Ok(())
}

pub fn format_month_text(view: &MealCalendarViewModel, plan: &MealPlan, options: &ViewOptions) -> String {
    let mut lines = Vec::new();
    lines.push(format!("{} – {}", plan.title, view.month_title()));
    lines.push(String::new());
    lines.push(" Su  Mo  Tu  We  Th  Fr  Sa".to_string());

    for week in &view.grid().weeks {
        let row: String = week
            .days
            .iter()
            .map(|slot| format_slot(view, *slot))
            .collect();
        lines.push(row.trim_end().to_string());
    }

    lines.push(String::new());
    lines.push(view.selected_date().format("%A, %B %d, %Y").to_string());

    let items = view.selected_items();
    if items.is_empty() {
        lines.push("Nothing planned.".to_string());
    } else {
        for item in items {
            lines.push(format!("- {}", build_item_line(item, options)));
        }
    }

    lines.join("\n")
}

fn format_slot(view: &MealCalendarViewModel, slot: DaySlot) -> String {
    let Some(day) = slot.day() else {
        return "  · ".to_string();
    };

    let marker = if view.meal_items_by_day(day).is_empty() { ' ' } else { '*' };
    if day == view.selected_day() {
        format!("[{:>2}]", day)
    } else {
        format!(" {:>2}{}", day, marker)
    }
}

fn build_item_line(item: &MealPlanItem, options: &ViewOptions) -> String {
    let mut line = format!("{:<10} {}", item.meal.label(), item.title);

    if options.show_recipe
        && let Some(recipe_id) = &item.recipe_id
    {
        line.push_str(&format!(" [recipe {}]", recipe_id));
    }
    if options.show_added_by
        && let Some(added_by) = &item.added_by
    {
        line.push_str(&format!(" by {}", added_by));
    }
    if options.show_added_on
        && let Some(created_at) = item.created_at
    {
        line.push_str(&format!(" on {}", created_at.format("%Y-%m-%d")));
    }

    line.push_str(&format!("  ({})", item.id));
    line
}

fn display_with_pager(text: &str) -> Result<()> {
    let pager_value = env::var("PAGER").unwrap_or_else(|_| "less".to_string());
    let mut parts = pager_value.split_whitespace();
    let cmd = match parts.next() {
        Some(c) => c,
        None => {
            println!("{text}");
            return Ok(());
        }
    };
    let args: Vec<&str> = parts.collect();

    match Command::new(cmd)
        .args(&args)
        .stdin(Stdio::piped())
        .spawn()
    {
        Ok(mut child) => {
            if let Some(stdin) = child.stdin.as_mut() {
                stdin.write_all(text.as_bytes())?;
            }
            let _ = child.wait();
        }
        Err(_) => {
            println!("{text}");
        }
    }

    Ok(())
}
