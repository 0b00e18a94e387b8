//! 输出解析函数
//!
//! `softwareupdate -l` 的典型输出：
//!
//! ```text
//! Software Update Tool
//!
//! Finding available software
//! Software Update found the following new or updated software:
//!    * iTunesX-12.7.3
//! 	iTunes (12.7.3), 264516K [recommended]
//! ```
//!
//! `softwareupdate --verbose -i <name>` 会输出 `Progress: 42%` 形式的进度行，
//! 名称不存在时输出以 `No such update` 结尾的行。

use super::types::Update;
use crate::version::Version;

const UPDATE_PREFIX: &str = "* ";
const DETAIL_PREFIX: char = '\t';
const SIZE_SUFFIX: &str = "K";
const RESTART_MARKER: &str = "[restart]";
const PROGRESS_PREFIX: &str = "Progress: ";
const PROGRESS_SUFFIX: &str = "%";
const NO_SUCH_UPDATE_SUFFIX: &str = "No such update";

/// 判断一行是否为更新公告，`next_line` 若为详情行则用于补全字段
pub fn parse_update(line: &str, next_line: Option<&str>) -> Option<Update> {
    // 只去掉前导空格：末尾空格属于引用名
    let reference_name = line.trim_start_matches(' ').strip_prefix(UPDATE_PREFIX)?;

    let mut update = Update {
        reference_name: reference_name.to_string(),
        application_name: application_name(reference_name),
        version: Version::find_in(reference_name).ok(),
        size_megabytes: None,
        restart_needed: false,
    };

    if let Some(detail) = next_line.filter(|l| l.starts_with(DETAIL_PREFIX)) {
        update.size_megabytes = update_size_megabytes(detail);

        if update.version.is_none() {
            update.version = Version::find_in(&update.reference_name).ok();
        }

        // 详情行给出的名称通常更准确
        let name = application_name(detail);
        if !name.is_empty() {
            update.application_name = name;
        }

        update.restart_needed = detail.contains(RESTART_MARKER);
    }

    Some(update)
}

/// 取第一个数字或 `(` 之前的文本作为应用名
pub fn application_name(text: &str) -> String {
    let text = text.trim();
    let prefix: String = text
        .chars()
        .take_while(|c| !c.is_numeric() && *c != '(')
        .collect();

    if prefix.is_empty() {
        return format!("Unknown Application ({})", text);
    }

    prefix.trim().to_string()
}

/// 从详情行中解析更新大小（`264516K` → 264 MB）
///
/// 换算固定使用 `kb / 1000`，非零但不足 1000K 的大小记为 1 MB。
/// 找不到大小字段或字段无法解析时返回 `None`。
pub fn update_size_megabytes(detail: &str) -> Option<u64> {
    let token = detail.split(' ').find(|part| {
        part.chars().next().is_some_and(char::is_numeric) && part.ends_with(SIZE_SUFFIX)
    })?;

    let digits: String = token.chars().filter(|c| c.is_numeric()).collect();
    let kb: u64 = digits.parse().ok()?;

    let mb = match kb / 1000 {
        0 if kb > 0 => 1,
        mb => mb,
    };

    (mb > 0).then_some(mb)
}

/// 解析 `Progress: 42%` 形式的安装进度
pub fn parse_install_progress(line: &str) -> Option<u8> {
    line.trim()
        .strip_prefix(PROGRESS_PREFIX)?
        .strip_suffix(PROGRESS_SUFFIX)?
        .parse::<u8>()
        .ok()
        .filter(|percent| *percent <= 100)
}

/// 判断一行是否表示请求的更新不存在
///
/// 只做子串匹配：若 `update_name` 恰好是无关行的子串也会命中。
pub fn is_no_such_update(update_name: &str, line: &str) -> bool {
    line.contains(update_name) && line.ends_with(NO_SUCH_UPDATE_SUFFIX)
}

/// 两行滑动窗口：当前行 + 预读的下一行
///
/// 既可以喂入已收集的完整输出，也可以逐行喂入实时输出流；
/// 任何时刻只保留一行，内存占用与总输出量无关。
#[derive(Debug, Default)]
pub struct UpdateClassifier {
    current: Option<String>,
}

impl UpdateClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 推入下一行；若窗口中的上一行是更新公告，则产出对应的 `Update`
    pub fn push(&mut self, line: String) -> Option<Update> {
        let previous = self.current.replace(line);
        previous.and_then(|prev| parse_update(&prev, self.current.as_deref()))
    }

    /// 输入结束，处理窗口中剩下的最后一行
    pub fn finish(&mut self) -> Option<Update> {
        self.current
            .take()
            .and_then(|last| parse_update(&last, None))
    }
}

/// 对一组完整的输出行进行分类
pub fn parse_updates<I, S>(lines: I) -> Vec<Update>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut classifier = UpdateClassifier::new();
    let mut updates: Vec<Update> = lines
        .into_iter()
        .filter_map(|line| classifier.push(line.into()))
        .collect();
    updates.extend(classifier.finish());
    updates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_trailing_space_in_reference_name() {
        let update = parse_update("   * iTunesX-12.7.3 ", None).unwrap();
        assert_eq!(update.reference_name, "iTunesX-12.7.3 ");
        assert_eq!(update.application_name, "iTunesX-");
        assert_eq!(update.version.unwrap().to_string(), "12.7.3");
        assert_eq!(update.size_megabytes, None);
        assert!(!update.restart_needed);
    }

    #[test]
    fn detail_line_refines_update() {
        let update = parse_update(
            "* iTunesX-12.7.3",
            Some("\tiTunes (12.7.3), 264516K [recommended]"),
        )
        .unwrap();
        assert_eq!(update.application_name, "iTunes");
        assert_eq!(update.size_megabytes, Some(264));
        assert!(!update.restart_needed);
    }

    #[test]
    fn restart_marker_sets_flag() {
        let update = parse_update(
            "   * macOS High Sierra 10.13.6 Supplemental Update-",
            Some("\tmacOS High Sierra 10.13.6 Supplemental Update ( ), 1291000K [recommended] [restart]"),
        )
        .unwrap();
        assert!(update.restart_needed);
        assert_eq!(update.application_name, "macOS High Sierra");
        assert_eq!(update.size_megabytes, Some(1291));
        assert_eq!(update.version.unwrap().to_string(), "10.13.6");
    }

    #[test]
    fn non_detail_next_line_is_ignored() {
        let update = parse_update("* App-2.0", Some("   * Other-1.0")).unwrap();
        assert_eq!(update.application_name, "App-");
        assert_eq!(update.size_megabytes, None);

        // 以空格而非 tab 开头也不算详情行
        let update = parse_update("* App-2.0", Some("    App (2.0), 100K [restart]")).unwrap();
        assert_eq!(update.size_megabytes, None);
        assert!(!update.restart_needed);
    }

    #[test]
    fn announcement_needs_marker_and_space() {
        assert!(parse_update("Software Update Tool", None).is_none());
        assert!(parse_update("*App-2.0", None).is_none());
        assert!(parse_update("\t* App-2.0", None).is_none());
    }

    #[test]
    fn application_name_placeholder() {
        assert_eq!(application_name("12.7.3"), "Unknown Application (12.7.3)");
        assert_eq!(application_name("\t(beta) 1K"), "Unknown Application ((beta) 1K)");
        assert_eq!(application_name("  Safari 13 "), "Safari");
    }

    #[test]
    fn size_rounds_up_below_one_megabyte() {
        assert_eq!(update_size_megabytes("\tApp (1.0), 500K"), Some(1));
        assert_eq!(update_size_megabytes("\tApp (1.0), 2000K"), Some(2));
        assert_eq!(update_size_megabytes("\tApp (1.0), 2999K"), Some(2));
        assert_eq!(update_size_megabytes("\tApp (1.0), 0K"), None);
    }

    #[test]
    fn size_missing_or_malformed() {
        assert_eq!(update_size_megabytes("\tApp (1.0) [recommended]"), None);
        assert_eq!(update_size_megabytes("\tApp (1.0), K500"), None);
        assert_eq!(update_size_megabytes("\tApp (1.0), 500KB"), None);
        // 只看第一个符合条件的字段
        assert_eq!(update_size_megabytes("\tApp 1,500K then 9000K"), Some(1));
        // 以 tab 开头的字段首字符不是数字
        assert_eq!(update_size_megabytes("\t1500K"), None);
    }

    #[test]
    fn progress_lines() {
        assert_eq!(parse_install_progress("Progress: 42%"), Some(42));
        assert_eq!(parse_install_progress("  Progress: 100%  "), Some(100));
        assert_eq!(parse_install_progress("Progress: abc%"), None);
        assert_eq!(parse_install_progress("Progress: 42"), None);
        assert_eq!(parse_install_progress("Downloaded 42%"), None);
        assert_eq!(parse_install_progress("Progress: 250%"), None);
    }

    #[test]
    fn no_such_update_needs_requested_name() {
        assert!(is_no_such_update("Foo-1.0", "Foo-1.0 No such update"));
        assert!(!is_no_such_update("Foo-1.0", "Bar-1.0 No such update"));
        assert!(!is_no_such_update("Foo-1.0", "Foo-1.0: No such update."));
    }

    #[test]
    fn end_to_end_two_lines() {
        let updates = parse_updates(["* App-2.0", "\tApp (2.0), 100K"]);
        assert_eq!(updates.len(), 1);
        let update = &updates[0];
        assert_eq!(update.version.as_ref().unwrap().to_string(), "2.0");
        assert_eq!(update.size_megabytes, Some(1));
        assert!(!update.restart_needed);
        assert_eq!(update.application_name, "App");
    }

    #[test]
    fn full_listing() {
        let output = [
            "Software Update Tool",
            "",
            "Finding available software",
            "Software Update found the following new or updated software:",
            "   * iTunesX-12.7.3",
            "\tiTunes (12.7.3), 264516K [recommended]",
            "   * Command Line Tools (macOS High Sierra version 10.13) for Xcode-9.4",
            "\tCommand Line Tools (macOS High Sierra version 10.13) for Xcode (9.4), 187312K [recommended]",
            "   * SecUpd2018-004-10.13.6 ",
        ];
        let updates = parse_updates(output);
        let names: Vec<&str> = updates.iter().map(|u| u.reference_name.as_str()).collect();
        assert_eq!(
            names,
            [
                "iTunesX-12.7.3",
                "Command Line Tools (macOS High Sierra version 10.13) for Xcode-9.4",
                "SecUpd2018-004-10.13.6 ",
            ]
        );
        assert_eq!(updates[1].application_name, "Command Line Tools");
        assert_eq!(updates[1].size_megabytes, Some(187));
        assert_eq!(updates[2].application_name, "SecUpd");
        assert_eq!(updates[2].version.as_ref().unwrap().to_string(), "2018");
    }

    #[test]
    fn classifier_is_deterministic() {
        let output = ["* A-1.0", "\tA (1.0), 1500K [restart]", "* B-2", "noise"];
        assert_eq!(parse_updates(output), parse_updates(output));
    }

    #[test]
    fn streaming_window_matches_batch() {
        let output = ["* A-1.0", "\tA (1.0), 1500K", "* B-2"];
        let mut classifier = UpdateClassifier::new();
        assert!(classifier.push(output[0].to_string()).is_none());
        let first = classifier.push(output[1].to_string()).unwrap();
        assert_eq!(first.size_megabytes, Some(1));
        assert!(classifier.push(output[2].to_string()).is_none());
        let last = classifier.finish().unwrap();
        assert_eq!(last.reference_name, "B-2");
        assert!(classifier.finish().is_none());
    }
}
