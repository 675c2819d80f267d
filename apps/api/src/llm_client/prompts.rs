// Prompt constants for the optimization pipeline. The exact wording is a
// template, not a contract: the rest of the system only depends on both input
// texts being embedded verbatim and on the POSITION_UPDATES output block,
// which the exporter parses.

/// System framing for every optimization call.
pub const OPTIMIZE_SYSTEM: &str =
    "You are an expert resume optimization assistant. You analyze a job \
    description to identify key requirements, then rewrite resume content to \
    align with them. You keep exact company names, position titles, and dates \
    unchanged, and you never invent employment history.";

/// Template used when both a resume and a job description are present.
/// Replace `{resume_text}` and `{job_description}` before sending.
pub const OPTIMIZE_PROMPT_TEMPLATE: &str = r#"Analyze the job description below, then optimize the resume content. Provide output in EXACTLY this format:

ANALYSIS:
[Brief analysis of key requirements and gaps]

POSITION_UPDATES:
[Exact Position Title As Shown in Resume]
[Exact Company & Dates As Shown in Resume]
- [Optimized bullet point starting with an action verb]
- [Optimized bullet point with metrics]
- [Optimized bullet point showing impact]

Bullet point rules:
- Match original length (plus or minus 10 words)
- Start with action verbs relevant to the job description
- Include metrics and quantifiable achievements where present
- Use keywords and terminology from the job posting naturally
- Limit to 3-4 most relevant bullets per position
- Maintain a professional tone

Position rules:
- Only update positions that already exist in the resume
- Keep exact company names and dates
- Focus on the positions most relevant to the job requirements
- Maintain chronological order

Resume:
{resume_text}

Job Description:
{job_description}"#;

/// Template used when no resume text is available: general advice keyed to
/// the posting alone.
pub const OPTIMIZE_JD_ONLY_TEMPLATE: &str = r#"Analyze the job description below and provide resume optimization advice for a candidate targeting this role.

Cover:
1. Key technical skills and requirements to emphasize
2. Required experience level
3. Industry-specific terminology to mirror
4. Achievements and metrics worth highlighting

Job Description:
{job_description}"#;
