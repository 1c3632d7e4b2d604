use crate::meal_plan::MealCategory;

#[derive(Debug, PartialEq)]
pub enum Command {
    Quit,
    NextMonth,
    PrevMonth,
    Today,
    SelectDay(u32),
    AddItem { meal: MealCategory, title: String },
    RemoveItem(String),
    Help,
    Error(String),
}

pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();

    let Some(command_text) = trimmed.strip_prefix(':') else {
        return Command::Error("Commands must start with ':'".to_string());
    };

    let parts: Vec<&str> = command_text.split_whitespace().collect();

    if parts.is_empty() {
        return Command::Error("Empty command".to_string());
    }

    match parts[0] {
        "q" | "quit" => Command::Quit,
        "n" | "next" => Command::NextMonth,
        "p" | "prev" => Command::PrevMonth,
        "t" | "today" => Command::Today,
        "help" => Command::Help,
        "d" | "day" => {
            if parts.len() < 2 {
                Command::Error("day requires a day of month".to_string())
            } else if let Ok(day) = parts[1].parse::<u32>() {
                Command::SelectDay(day)
            } else {
                Command::Error(format!("Invalid day: {}", parts[1]))
            }
        }
        "add" => {
            if parts.len() < 3 {
                Command::Error("add requires a meal and a title".to_string())
            } else {
                Command::AddItem {
                    meal: MealCategory::parse(&parts[1].to_lowercase()),
                    title: parts[2..].join(" "),
                }
            }
        }
        "rm" | "remove" => {
            if parts.len() < 2 {
                Command::Error("rm requires an item id".to_string())
            } else {
                Command::RemoveItem(parts[1].to_string())
            }
        }
        _ => Command::Error(format!("Unknown command: {}", parts[0])),
    }
}
