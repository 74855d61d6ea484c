//! Prompt text for the reasoning service.

use crate::utils::truncate_chars;

/// Cap on the article text sent in any single prompt.
pub const MAX_INPUT_CHARS: usize = 6000;

/// Stage A: free-form Korean bullet digest.
pub fn draft(title: &str, description: &str, body: &str, max_lines: usize) -> String {
    format!(
        "다음 뉴스 내용을 한국어로 문맥 보존 요약해줘.\n\
         규칙:\n\
         - 글머리표(-)로 시작하는 줄만 출력\n\
         - 최대 {max_lines}줄\n\
         - 한 줄에 하나의 사실만 서술\n\
         - 문장이 길면 하위 글머리표로 나눌 것\n\
         - 핵심 배경, 영향, 시사점을 사실 중심으로 포함\n\n\
         제목: {title}\n\
         설명: {description}\n\
         본문: {body}\n",
        body = truncate_chars(body, MAX_INPUT_CHARS),
    )
}

/// Stage B: reformat a Stage A draft into strict one-statement bullets.
pub fn reformat(draft: &str, max_lines: usize) -> String {
    format!(
        "아래 요약을 형식만 정리해줘. 내용을 추가하거나 삭제하지 마.\n\
         규칙:\n\
         - 모든 줄은 \"- \"로 시작\n\
         - 한 줄에 한 문장\n\
         - 모든 문장은 마침표로 끝낼 것\n\
         - 최대 {max_lines}줄\n\
         - 설명이나 머리말 없이 결과만 출력\n\n\
         요약:\n{draft}\n",
        draft = truncate_chars(draft, MAX_INPUT_CHARS),
    )
}

/// Four-part short summary: title, key takeaway, three bullets.
pub fn structured(title: &str, text: &str) -> String {
    format!(
        "다음 기사를 아래 형식 그대로 한국어로 요약해줘.\n\
         제목: (20자 이내의 짧은 제목)\n\
         핵심: (1~2문장 핵심 요약)\n\
         - (요점 1)\n\
         - (요점 2)\n\
         - (요점 3)\n\n\
         기사 제목: {title}\n\
         기사 본문: {text}\n",
        text = truncate_chars(text, MAX_INPUT_CHARS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_mentions_line_limit_and_content() {
        let prompt = draft("새 칩셋 발표", "회사가 새로운 반도체를 공개했다.", "", 7);
        assert!(prompt.contains("최대 7줄"));
        assert!(prompt.contains("제목: 새 칩셋 발표"));
        assert!(prompt.contains("설명: 회사가 새로운 반도체를 공개했다."));
    }

    #[test]
    fn test_body_is_capped() {
        let body = "가".repeat(MAX_INPUT_CHARS + 500);
        let prompt = draft("t", "d", &body, 3);
        assert!(prompt.chars().count() < MAX_INPUT_CHARS + 400);
        assert!(structured("t", &body).chars().count() < MAX_INPUT_CHARS + 400);
    }
}
