use chrono::Local;

use crate::software_update::Update;

/// 单条更新的纯文本描述
pub fn render_update(update: &Update) -> String {
    let mut lines = vec![
        format!("Name: '{}'", update.reference_name),
        format!("Application: '{}'", update.application_name),
    ];

    match &update.version {
        Some(version) => lines.push(format!("Version: {}", version)),
        None => lines.push("No version available".to_string()),
    }

    match update.size_megabytes {
        Some(mb) if update.has_update_size() => lines.push(format!("Update size in mb: {}", mb)),
        _ => lines.push("Update size not available".to_string()),
    }

    lines.push(format!("Is restart needed: {}", update.restart_needed));
    lines.join("\n")
}

/// 带检查时间头部的完整列表
pub fn render_report(updates: &[Update]) -> String {
    let now = Local::now();

    let mut report = format!(
        "可用更新: {}\n检查时间: {}\n",
        updates.len(),
        now.format("%Y-%m-%d %H:%M:%S")
    );

    for update in updates {
        report.push('\n');
        report.push_str(&render_update(update));
        report.push('\n');
    }

    report
}

pub fn render_json(updates: &[Update]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(updates)
}
