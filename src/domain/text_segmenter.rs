//! 文本分割器
//!
//! 先清洗文本（控制字符 / 标记字符替换为空白、合并空白），
//! 再按最大字符数切分，优先在句末标点、子句标点、空白处切分

use thiserror::Error;

/// 默认最大字符数（单次合成请求的文本上限）
pub const DEFAULT_MAX_CHARS: usize = 1000;

/// 文本清洗错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SegmentError {
    #[error("Text is empty after sanitizing")]
    EmptyInput,
}

/// 文本分割配置
#[derive(Debug, Clone)]
pub struct SegmentConfig {
    /// 单个片段的最大字符数
    pub max_chars: usize,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

/// 检查是否为强分隔符（句末标点，优先切分）
#[inline]
fn is_strong_delimiter(ch: char) -> bool {
    matches!(ch, '。' | '？' | '！' | '.' | '?' | '!')
}

/// 检查是否为弱分隔符（子句标点，无句末标点时切分）
#[inline]
fn is_weak_delimiter(ch: char) -> bool {
    matches!(ch, '，' | '；' | '：' | ',' | ';' | ':')
}

/// 不允许出现在合成文本中的字符（控制字符、标记 / shell 元字符）
#[inline]
fn is_disallowed(ch: char) -> bool {
    ch.is_control()
        || matches!(
            ch,
            '\\' | '|' | '*' | '~' | '<' | '>' | '^' | '(' | ')' | '[' | ']' | '{' | '}'
        )
}

/// 清洗文本
///
/// 1. 不允许的字符替换为空格
/// 2. 连续空白合并为单个空格
/// 3. 去除首尾空白
pub fn sanitize_text(raw: &str) -> Result<String, SegmentError> {
    let replaced: String = raw
        .chars()
        .map(|c| if is_disallowed(c) { ' ' } else { c })
        .collect();

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Err(SegmentError::EmptyInput);
    }
    Ok(collapsed)
}

/// 分割后的文本片段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSegment<'a> {
    /// 片段序号（从 0 开始）
    pub index: usize,
    /// 片段内容（首尾无空白，非空）
    pub text: &'a str,
}

/// 片段迭代器
///
/// 惰性、有限，`Clone` 后可重新开始
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    rest: &'a str,
    max_chars: usize,
    index: usize,
}

impl<'a> Segments<'a> {
    fn emit(&mut self, text: &'a str) -> TextSegment<'a> {
        let segment = TextSegment {
            index: self.index,
            text,
        };
        self.index += 1;
        segment
    }
}

/// 在窗口内查找切分位置（字节偏移）
///
/// 强分隔符 > 弱分隔符 > 空白，均取窗口内最后一个
fn find_cut(window: &str) -> Option<usize> {
    let after = |(i, c): (usize, char)| i + c.len_utf8();

    window
        .char_indices()
        .rev()
        .find(|&(_, c)| is_strong_delimiter(c))
        .map(after)
        .or_else(|| {
            window
                .char_indices()
                .rev()
                .find(|&(_, c)| is_weak_delimiter(c))
                .map(after)
        })
        .or_else(|| {
            window
                .char_indices()
                .rev()
                .find(|&(i, c)| i > 0 && c.is_whitespace())
                .map(|(i, _)| i)
        })
}

impl<'a> Iterator for Segments<'a> {
    type Item = TextSegment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest.trim_start();
        if rest.is_empty() {
            self.rest = rest;
            return None;
        }

        // 剩余部分不超过上限，作为最后一个片段
        let window_end = match rest.char_indices().nth(self.max_chars) {
            Some((offset, _)) => offset,
            None => {
                self.rest = "";
                return Some(self.emit(rest.trim_end()));
            }
        };

        let cut = find_cut(&rest[..window_end]).unwrap_or(window_end);
        let (head, tail) = rest.split_at(cut);
        self.rest = tail;
        Some(self.emit(head.trim_end()))
    }
}

/// 对已清洗的文本进行分段
pub fn segment_text<'a>(text: &'a str, config: &SegmentConfig) -> Segments<'a> {
    Segments {
        rest: text,
        max_chars: config.max_chars.max(1),
        index: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(text: &str, max_chars: usize) -> Vec<String> {
        segment_text(text, &SegmentConfig { max_chars })
            .map(|s| s.text.to_string())
            .collect()
    }

    #[test]
    fn test_sanitize_collapses_markup_and_whitespace() {
        let text = sanitize_text("  Hello <b>world</b>\n\n\thow (are) you?  ").unwrap();
        assert_eq!(text, "Hello b world /b how are you?");
    }

    #[test]
    fn test_sanitize_rejects_empty() {
        assert_eq!(sanitize_text("   \n\t "), Err(SegmentError::EmptyInput));
        assert_eq!(sanitize_text("<>{}[]"), Err(SegmentError::EmptyInput));
    }

    #[test]
    fn test_short_text_single_segment() {
        let segments = collect("Hello world.", 1000);
        assert_eq!(segments, vec!["Hello world."]);
    }

    #[test]
    fn test_strong_delimiter_preferred() {
        // 窗口内同时有句号、逗号和空白，应在最后一个句号后切分
        let segments = collect("One two. Three, four five six", 20);
        assert_eq!(segments[0], "One two.");
        assert_eq!(segments[1], "Three, four five six");
    }

    #[test]
    fn test_weak_delimiter_when_no_sentence_end() {
        let segments = collect("alpha beta, gamma delta epsilon", 20);
        assert_eq!(segments[0], "alpha beta,");
        assert_eq!(segments[1], "gamma delta epsilon");
    }

    #[test]
    fn test_hard_cut_without_whitespace() {
        let text = "a".repeat(25);
        let segments = collect(&text, 10);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].len(), 10);
        assert_eq!(segments[2].len(), 5);
    }

    #[test]
    fn test_cjk_counts_chars_not_bytes() {
        let text = "这是第一句。这是第二句。这是第三句。";
        let segments = collect(text, 7);
        assert_eq!(segments, vec!["这是第一句。", "这是第二句。", "这是第三句。"]);
    }

    #[test]
    fn test_2500_chars_without_punctuation() {
        let raw = "abcd ".repeat(500);
        let text = sanitize_text(&raw).unwrap();
        let segments = collect(&text, DEFAULT_MAX_CHARS);

        assert_eq!(segments.len(), 3);
        for seg in &segments {
            assert!(seg.chars().count() <= DEFAULT_MAX_CHARS);
            assert!(seg.ends_with("abcd"));
        }
        // 切分点都在空白处
        assert_eq!(segments.join(" "), text);
    }

    #[test]
    fn test_segments_reassemble_to_sanitized_text() {
        let raw = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Sed do eiusmod \
                   tempor incididunt ut labore et dolore magna aliqua! Ut enim ad minim veniam; \
                   quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea commodo.";
        let text = sanitize_text(raw).unwrap();

        for max_chars in [8, 17, 40, 64, 1000] {
            let segments = collect(&text, max_chars);
            assert!(segments.iter().all(|s| !s.is_empty()));
            assert!(segments.iter().all(|s| s.chars().count() <= max_chars));

            let strip = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
            assert_eq!(strip(&segments.concat()), strip(&text));
        }
    }

    #[test]
    fn test_iterator_is_restartable() {
        let text = "First sentence. Second sentence. Third sentence.";
        let segments = segment_text(text, &SegmentConfig { max_chars: 20 });
        let first: Vec<_> = segments.clone().collect();
        let second: Vec<_> = segments.collect();
        assert_eq!(first, second);
        assert_eq!(first.iter().map(|s| s.index).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_default_config() {
        let segments: Vec<_> = segment_text("测试内容。", &SegmentConfig::default()).collect();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "测试内容。");
    }
}
