//! Built-in lookup tables
//!
//! Category names double as the category strings that appear in evidence
//! items, prompts and answers.

/// Sexual harassment / obscene speech
pub const SEXUAL_HARASSMENT: &str = "성희롱/음란발언";
/// Threats and verbal assault
pub const THREAT: &str = "협박/폭행(폭언) 가능성";
/// Insult, defamation, verbal abuse
pub const INSULT: &str = "명예훼손·모욕·폭언";
/// Obstruction of business
pub const OBSTRUCTION: &str = "업무방해";
/// Coercion
pub const COERCION: &str = "강요";
/// Prank calls / minor offences
pub const PRANK_CALL: &str = "장난전화/경범";
/// Repeated, habitual complaints
pub const REPEATED_COMPLAINT: &str = "반복(고질.강성민원)";
/// Stalking
pub const STALKING: &str = "스토킹";

/// Keyword rules that yield (category, legal reference) hints, in output order
///
/// A reference string may join several references with `;`; the evidence
/// canonicalizer splits them.
pub const KEYWORD_RULES: &[(&[&str], &str, &str)] = &[
    (&["성희롱", "음란", "음담"], SEXUAL_HARASSMENT, "성폭력범죄의 처벌 등에 관한 특례법 제13조"),
    (&["욕설", "협박", "폭언"], THREAT, "형법 제283조; 형법 제260조"),
    (&["모욕", "명예훼손", "폭언"], INSULT, "형법 제307조; 형법 제311조"),
    (&["업무방해"], OBSTRUCTION, "형법 제314조"),
    (&["강요"], COERCION, "형법 제324조"),
    (&["장난전화", "괴롭힘"], PRANK_CALL, "경범죄처벌법 제3조 제1항 제40호"),
    (&["반복적인 민원"], REPEATED_COMPLAINT, "경범죄처벌법 제3조 제1항 제40호"),
    (&["스토킹"], STALKING, "스토킹범죄의 처벌 등에 관한 법률 제18조"),
];

/// Category → vocabulary that licenses (or, when disallowed, bans) the category
pub const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        SEXUAL_HARASSMENT,
        &["성희롱", "음란", "성적", "목소리", "야하", "야한", "섹스", "음담", "음탕"],
    ),
    (
        THREAT,
        &["죽여버린다", "폭언", "욕설", "협박", "죽여", "패버린다", "죽고 싶냐", "시발", "씨발", "ㅅㅂ", "개새"],
    ),
    (INSULT, &["모욕", "명예훼손", "비방", "바보", "멍청", "병신", "등신"]),
    (OBSTRUCTION, &["업무방해", "업무 방해"]),
    (COERCION, &["강요"]),
    (STALKING, &["스토킹", "지속 연락", "반복 연락"]),
];

/// Most specific categories first; used to pick a single headline category
pub const CATEGORY_PRIORITY: &[&str] = &[
    THREAT,
    SEXUAL_HARASSMENT,
    INSULT,
    STALKING,
    COERCION,
    OBSTRUCTION,
    PRANK_CALL,
    REPEATED_COMPLAINT,
];

/// Neutral wording substituted for banned vocabulary, by allowed category
pub const REPLACEMENT_TERMS: &[(&str, &str)] = &[(THREAT, "폭언"), (INSULT, "모욕/폭언")];

/// Replacement when no allowed category has a dedicated term
pub const DEFAULT_REPLACEMENT: &str = "부적절한 발언";

/// One-line legal briefs keyed by canonical reference
pub const LAW_BRIEFS: &[(&str, &str)] = &[
    ("성폭력범죄의 처벌 등에 관한 특례법 제13조", "통신수단을 이용한 성적 수치심 유발 행위를 처벌합니다. (2년 이하 징역 또는 2천만원 이하 벌금)"),
    ("형법 제283조", "상대에게 공포심을 유발하는 협박 행위를 처벌합니다. (3년 이하 징역 또는 500만원 이하 벌금)"),
    ("형법 제260조", "상대방 신체에 대한 유형력 행사(폭행)를 처벌합니다. (2년 이하 징역 또는 500만원 이하 벌금)"),
    ("형법 제307조", "허위/사실 적시로 타인의 명예를 훼손하는 행위를 처벌합니다. (2년 이하 징역 또는 500만원 이하 벌금)"),
    ("형법 제311조", "공연한 모욕행위를 처벌합니다. (1년 이하 징역 또는 200만원 이하 벌금)"),
    ("형법 제314조", "위력 기타 방법으로 타인의 업무를 방해하는 행위를 처벌합니다. (5년 이하 징역 또는 1천5백만원 이하 벌금)"),
    ("형법 제324조", "폭행/협박 등으로 의사에 반해 의무 없는 일을 하게 하는 강요를 처벌합니다. (5년 이하 징역 또는 3천만원 이하 벌금)"),
    ("경범죄처벌법 제3조 제1항 제40호", "정당한 이유 없는 반복 전화 등 괴롭힘을 제재합니다. (10만원 이하 벌금·구류·과료)"),
    ("스토킹범죄의 처벌 등에 관한 법률 제18조", "지속·반복적 스토킹 범죄를 처벌하고 보호조치를 규정합니다. (3년 이하 징역 또는 3천만원 이하 벌금)"),
    ("국민권익위원회 상담사 보호 지침", "상담 과정에서 발생하는 욕설·폭언·성희롱 등 악·강성 민원으로부터 상담사를 보호하기 위해 마련된 제도적 지침입니다. 상담 종료 기준, 기록 관리, 보호 조치 절차 등을 규정합니다."),
];

/// Fallback briefs chosen by substrings of the reference name, first match wins
pub const BRIEF_FALLBACKS: &[(&[&str], &str)] = &[
    (&["협박"], "협박 행위 전반을 처벌합니다."),
    (&["폭행"], "타인에 대한 유형력 행사(폭행)를 처벌합니다."),
    (&["모욕"], "공연한 모욕을 처벌합니다."),
    (&["명예훼손"], "허위/사실 적시 명예훼손을 처벌합니다."),
    (&["업무방해"], "업무 수행을 방해하는 행위를 처벌합니다."),
    (&["스토킹"], "지속·반복적 스토킹을 처벌하고 피해자 보호를 규정합니다."),
    (&["성폭력", "이용음란", "통신"], "통신수단을 이용한 성적 수치심 유발 행위를 처벌합니다."),
];

/// Brief used when neither the table nor a fallback keyword applies
pub const GENERIC_BRIEF: &str = "관련 행위를 규율·제재하여 피해 방지를 도모합니다.";

/// Keyword-triggered reference notes appended to the prompt
pub const ADDITIONAL_LAW_NOTES: &[(&[&str], &str)] = &[
    (
        &["성희롱", "음란", "음담"],
        "📚 성희롱 관련 법률:\n- 성폭력범죄의 처벌 등에 관한 특례법 제13조: 2년 이하 징역 또는 2천만원 이하 벌금",
    ),
    (
        &["욕설", "협박", "폭언"],
        "📚 욕설·협박·폭언 관련 법률:\n- 형법 제283조(협박): 3년 이하 징역 또는 500만원 이하 벌금\n- 형법 제260조(폭행): 2년 이하 징역 또는 500만원 이하 벌금",
    ),
    (
        &["모욕", "명예훼손", "폭언"],
        "📚 명예훼손·모욕·폭언 관련 법률:\n- 형법 제307조(명예훼손): 2년 이하 징역 또는 500만원 이하 벌금\n- 형법 제311조(모욕): 1년 이하 징역 또는 200만원 이하 벌금",
    ),
    (&["업무방해"], "📚 업무방해 관련 법률:\n- 형법 제314조(업무방해): 5년 이하 징역 또는 1천5백만원 이하 벌금"),
    (&["강요"], "📚 강요 관련 법률:\n- 형법 제324조(강요): 5년 이하 징역 또는 3천만원 이하 벌금"),
    (
        &["장난전화", "괴롭힘"],
        "📚 장난전화 관련 법률:\n- 경범죄처벌법 제3조 제1항 제40호: 10만원 이하 벌금, 구류, 과료",
    ),
    (
        &["스토킹"],
        "📚 스토킹 관련 법률:\n- 스토킹범죄의 처벌 등에 관한 법률 제18조 제1항: 3년 이하 징역 또는 3천만원 이하 벌금",
    ),
];

/// Profanity matched against normalized text
pub const BADWORDS: &[&str] = &[
    "시발", "씨발", "개새끼", "병신", "등신", "미친", "꺼져", "닥쳐", "지랄", "염병", "죽여버린다",
];

/// Profanity that blocks unconditionally, bypassing the classifier
pub const FORCE_BLOCK: &[&str] = &["시발", "씨발", "개새끼"];

/// Vocabulary that marks a message as smalltalk
pub const SMALLTALK_KEYWORDS: &[&str] = &[
    "안녕", "안뇽", "하이", "hi", "hello", "헬로", "헤이", "방가", "ㅎㅇ", "그냥", "잘 지내", "뭐해", "심심해",
    "심심", "ㅎㅎ", "ㅋㅋ", "굿모닝", "굿밤", "잘자", "좋은 아침", "수고", "고마워", "땡큐", "감사", "thanks",
    "thx", "ㄳ", "테스트",
];

/// Smalltalk replies, first matching group wins
pub const SMALLTALK_REPLIES: &[(&[&str], &str)] = &[
    (
        &["안녕", "안뇽", "하이", "hello", "hi", "헬로", "헤이", "방가", "ㅎㅇ"],
        "안녕하세요! 만나서 반가워요 😊 무엇을 도와드릴까요?",
    ),
    (&["굿모닝", "좋은 아침"], "안녕하세요! 잘 지내셨나요? 😊 무엇을 도와드릴까요?"),
    (&["굿밤", "잘자"], "고마워요! 편안한 밤 되세요 🌛"),
    (
        &["고마워", "감사", "땡큐", "thx", "thanks", "수고", "ㄳ"],
        "별말씀을요! 도움이 되어 기뻐요. 또 궁금한 점 있으면 편하게 물어보세요.",
    ),
    (&["뭐해", "심심해", "심심"], "여기 있어요! 질문을 기다리는 중이에요. 어떤 도움이 필요하신가요?"),
    (&["ㅎㅎ", "ㅋㅋ", "그냥"], "헤헤 😄 농담도 좋아요. 이제 본론으로 돌아가서, 무엇을 도와드릴까요?"),
    (&["테스트"], "개발하느라 고생이 많아요. 그래도 끝까지 파이팅!💪"),
];

/// Reply when smalltalk matched but no specific group did
pub const SMALLTALK_DEFAULT_REPLY: &str =
    "안녕하세요! 편하게 말씀해 주세요. 민원/상담 관련도 좋고, 일반적인 질문도 환영해요.";

/// Phrases asking what the caller actually said
pub const CALLER_WORDS_PHRASES: &[&str] = &["뭐라고 했", "무슨 말", "한 말"];
