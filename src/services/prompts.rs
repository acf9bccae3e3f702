//! Prompt templates and the context snippets substituted into them.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::{ChatMessage, ItineraryItem, TripContext};

/// Messages of chat history included in suggestion prompts.
pub const CHAT_TAIL: usize = 20;
/// Messages of chat history included in full-plan prompts.
pub const PLAN_CHAT_TAIL: usize = 30;

pub const THEME_KEYWORDS: &[&str] = &[
    "adventurous",
    "adventure",
    "romantic",
    "relaxing",
    "cultural",
    "foodie",
    "budget",
    "luxury",
    "family",
    "kid-friendly",
    "party",
    "nightlife",
    "nature",
    "outdoor",
    "historical",
    "artistic",
    "spiritual",
    "wellness",
    "shopping",
    "beach",
    "mountain",
    "active",
    "lazy",
    "fun",
    "exciting",
    "peaceful",
    "quiet",
    "lively",
    "local",
    "authentic",
    "touristy",
    "offbeat",
];

/// Role, goal and backstory for one agent.
#[derive(Debug, Clone, Copy)]
pub struct Persona {
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
}

pub const MODIFIER: Persona = Persona {
    role: "Itinerary Modifier",
    goal: "Quickly update or remove items from the itinerary JSON based on user requests.",
    backstory: "You are a precise data assistant. You do not plan trips, you only manipulate JSON data structures accurately.",
};

pub const LOCAL_EXPERT: Persona = Persona {
    role: "Local Expert & Planner",
    goal: "Find the best places matching the request and format them for the itinerary.",
    backstory: "You are a knowledgeable local guide who knows the best spots. You are efficiency-focused and always return structured data.",
};

pub const CREATIVE_PLANNER: Persona = Persona {
    role: "Creative Trip Planner",
    goal: "Create themed, personalized JSON itineraries that match the user's vision.",
    backstory: "You are a creative travel planner who crafts unique experiences. You pay close attention to adjectives and themes in requests. When someone asks for an ADVENTUROUS trip you include thrilling activities like scuba diving, hiking and zip-lining, not museums or generic sightseeing.",
};

pub const RESEARCHER: Persona = Persona {
    role: "Travel Researcher",
    goal: "Find the best travel options, restaurants, attractions, and activities.",
    backstory: "You are an expert travel researcher who knows how to find the best local experiences and hidden gems.",
};

pub const PREFERENCE_ANALYST: Persona = Persona {
    role: "Group Preference Analyst",
    goal: "Analyze group chat messages to understand what the group likes and dislikes. Extract food preferences, activity interests, budget hints, and time preferences.",
    backstory: "You are skilled at reading between the lines and understanding group dynamics. You pick up on subtle hints about what people really want.",
};

pub const ITINERARY_PLANNER: Persona = Persona {
    role: "Trip Itinerary Planner",
    goal: "Create well-organized itineraries that balance everyone's preferences, consider travel times between locations and avoid scheduling conflicts.",
    backstory: "You are an experienced travel planner. You always consider practical constraints like travel time and make sure activities flow smoothly.",
};

pub const CLASSIFIER_SYSTEM: &str = "You classify trip-planning chat requests. Reply with exactly one word: REMOVE, MODIFY, SUGGEST, PLAN or GENERAL.";

/// Few-shot user turn for intent classification.
pub fn classifier_prompt(query: &str) -> String {
    format!(
        r#"Classify the request into one category.

REMOVE  - delete, cancel or clear existing itinerary items
MODIFY  - move, reschedule, rename or otherwise change existing items
SUGGEST - find places or options, or add a specific activity
PLAN    - create a whole itinerary or a full day plan
GENERAL - anything else that needs research and planning

Examples:
"remove breakfast on day 2" -> REMOVE
"clear day 3" -> REMOVE
"move dinner to 8pm" -> MODIFY
"rename the beach visit to Sunset Walk" -> MODIFY
"suggest seafood restaurants for day 1 dinner" -> SUGGEST
"add scuba diving on day 3" -> SUGGEST
"create an adventurous 4 day itinerary" -> PLAN
"plan day 2 for us" -> PLAN
"what is the weather like and what should we pack?" -> GENERAL

Request: "{query}"
Category:"#
    )
}

/// Trip settings followed by the group's persistent preferences.
pub fn context_block(ctx: &TripContext) -> String {
    let settings = &ctx.settings;
    let prefs = &ctx.preferences;

    let or = |value: &Option<String>, fallback: &str| {
        value.clone().unwrap_or_else(|| fallback.to_string())
    };
    let count = |value: Option<u32>| {
        value
            .map(|n| n.to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    };

    format!(
        "Trip Destination: {}\n\
         Group Size: {}\n\
         Duration: {} days, {} nights\n\
         Age Group: {}\n\
         Landing Time: {}\n\
         Departure Time: {}\n\
         Hotel: {}\n\
         Airport: {}\n\
         \n\
         USER PREFERENCES (Persistent):\n\
         - Dietary: {}\n\
         - Interests: {}\n\
         - Constraints: {}\n\
         - Budget: {}",
        or(&settings.destination, "Unknown"),
        count(settings.group_size),
        count(settings.days_count),
        count(settings.nights_count),
        or(&settings.age_group, "mixed"),
        or(&settings.landing_time, "Not specified"),
        or(&settings.departure_time, "Not specified"),
        or(&settings.hotel, "Not specified"),
        or(&settings.airport, "Not specified"),
        prefs.dietary.join(", "),
        prefs.interests.join(", "),
        prefs.constraints.join(", "),
        or(&prefs.budget, "Not specified"),
    )
}

/// The last `limit` chat messages as `Sender: content` lines.
pub fn chat_tail(history: &[ChatMessage], limit: usize) -> String {
    let skip = history.len().saturating_sub(limit);
    history[skip..]
        .iter()
        .map(|message| format!("{}: {}", message.sender_name, message.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One `Day N: Title at HH:MM-HH:MM` line per item.
pub fn itinerary_summary(items: &[ItineraryItem]) -> String {
    if items.is_empty() {
        return "No items scheduled yet.".to_string();
    }

    items
        .iter()
        .map(|item| {
            let day = item
                .day
                .map(|day| day.to_string())
                .unwrap_or_else(|| "?".to_string());
            let mut line = format!("Day {}: {}", day, item.title);
            match (&item.start_time, &item.end_time, item.duration) {
                (Some(start), Some(end), _) => line.push_str(&format!(" at {start}-{end}")),
                (Some(start), None, _) => line.push_str(&format!(" at {start}")),
                (None, _, Some(minutes)) => line.push_str(&format!(" ({minutes} min)")),
                _ => {}
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Day number mentioned in the request (`day 3`, `Day3`).
pub fn target_day(query: &str) -> Option<u32> {
    static DAY_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = DAY_PATTERN
        .get_or_init(|| Regex::new(r"(?i)\bday\s*(\d{1,2})\b").ok())
        .as_ref()?;

    pattern
        .captures(query)
        .and_then(|captures| captures.get(1))
        .and_then(|day| day.as_str().parse().ok())
}

/// Theme keywords present in the request, in list order.
pub fn detect_themes(query: &str) -> Vec<&'static str> {
    let lowered = query.to_lowercase();
    THEME_KEYWORDS
        .iter()
        .copied()
        .filter(|theme| lowered.contains(theme))
        .collect()
}

pub fn themed_goal(themes: &[&str]) -> String {
    if themes.is_empty() {
        return CREATIVE_PLANNER.goal.to_string();
    }
    format!(
        "Create a {} themed itinerary. EVERY activity must be {}!",
        themes.join(", ").to_uppercase(),
        themes.join(", ")
    )
}

fn theme_block(themes: &[&str]) -> String {
    if themes.is_empty() {
        return "Create an interesting, engaging itinerary with varied activities.".to_string();
    }

    format!(
        r#"MANDATORY THEME REQUIREMENT
THE USER REQUESTED: **{upper}**
This is not optional. You MUST create a {lower} itinerary.

THEME-SPECIFIC ACTIVITIES:
- adventurous/adventure: Hiking, Trekking, Scuba Diving, Snorkeling, Zip-lining, Rock Climbing, Paragliding, Kayaking, White Water Rafting, Surfing
- romantic: Couples Spa, Sunset Dinner, Scenic Walk, Wine Tasting, Rooftop Bar, Boat Ride, Beach Picnic
- relaxing: Spa Treatment, Beach Lounging, Garden Walk, Cafe Visit, Pool Time, Yoga Session
- cultural: Museum Visit, Temple Tour, Historical Site, Local Market, Traditional Show, Cooking Class
- foodie: Food Tour, Street Food Walk, Cooking Class, Market Visit, Local Restaurant Hop
- nature/outdoor: National Park, Hiking Trail, Wildlife Safari, Waterfall Visit, Bird Watching
- nightlife/party: Club Hopping, Bar Crawl, Live Music, Rooftop Lounge, Beach Party

Do NOT fall back to generic activities like "City Tour" or "Sightseeing" when a theme is requested."#,
        upper = themes.join(", ").to_uppercase(),
        lower = themes.join(", ")
    )
}

pub fn remove_prompt(query: &str, ctx: &TripContext) -> String {
    format!(
        r#"The user wants to REMOVE item(s) from the itinerary.

User Request: {query}

Existing Itinerary:
{itinerary}

Trip Settings:
{context}

Identify the EXACT item(s) to remove based on the user's request.
Match the title and day from the existing itinerary.

OUTPUT ONLY JSON (no text) with action "remove_items":
```json
{{
    "action": "remove_items",
    "items": [
        {{"title": "Exact title from itinerary", "day": 1}}
    ]
}}
```

RULES:
1. Use the EXACT title as it appears in the existing itinerary.
2. "day" must match the item's day.
3. For "clear day X", "empty day X" or "reset day X", list EVERY item on day X.
4. Output ONLY JSON, no other text."#,
        itinerary = itinerary_summary(&ctx.itinerary),
        context = context_block(ctx),
    )
}

pub fn modify_prompt(query: &str, ctx: &TripContext) -> String {
    format!(
        r#"The user wants to MODIFY the itinerary.

User Request: {query}

Existing Itinerary:
{itinerary}

Trip Settings:
{context}

Identify the item(s) to modify.

OUTPUT ONLY JSON (no text) with action "update_items":
```json
{{
    "action": "update_items",
    "updates": [
        {{"originalTitle": "Exact or partial title of item", "day": 1, "newStartTime": "20:00", "newEndTime": "22:00"}}
    ]
}}
```

For moving items set "newStartTime"/"newEndTime" (and "newDay" to change days).
For renaming add "newTitle".

RULES:
1. Use 24-hour HH:MM times.
2. "day" must match the item's current day.
3. Output ONLY JSON."#,
        itinerary = itinerary_summary(&ctx.itinerary),
        context = context_block(ctx),
    )
}

pub fn suggest_prompt(query: &str, ctx: &TripContext, history: &[ChatMessage]) -> String {
    format!(
        r#"User Request: {query}

Trip Context:
{context}

Recent chat:
{chat}

CURRENT SCHEDULE (analyze this carefully):
{itinerary}

YOUR TASK: Add the requested activity to the schedule.

SCHEDULING STRATEGY:
1. Analyze the current schedule for the relevant day(s).
2. Fit the new activity in without overfilling the day.
3. Give it a REALISTIC duration (scuba diving: 120-180 mins, beach visit: 120 mins).

ITEM PRIORITY:
- FIXED (don't change): Breakfast, Lunch, Dinner, airport transfers
- IMPORTANT (minimize changes): tours with tickets, reservations
- FLEXIBLE (can shorten/move): beach visits, sightseeing, free time

Search for real places with the web_search tool, then answer with this JSON:
```json
{{
    "action": "smart_schedule",
    "isOptions": true,
    "newItems": [
        {{"title": "Option A: Scuba Diving", "description": "Deep dive at Neil Island", "day": 3, "duration": 180, "startTime": "09:00", "endTime": "12:00", "location": "Neil Island"}},
        {{"title": "Option B: Glass Bottom Boat", "description": "Relaxed view of coral", "day": 3, "duration": 180, "startTime": "09:00", "endTime": "12:00", "location": "Neil Jetty"}}
    ],
    "itemsToRemove": ["Breakfast"],
    "reschedule": []
}}
```

RULES:
1. "isOptions" is true whenever the user asks for suggestions, options, places, ideas or recommendations.
2. Provide 2 to 3 DIFFERENT options, all with the SAME day, startTime and duration.
3. If a generic item like "Breakfast" or "Lunch" occupies that slot, list its exact title in "itemsToRemove".
4. You MUST end your response with the JSON block. The user only sees items added through JSON."#,
        context = context_block(ctx),
        chat = chat_tail(history, CHAT_TAIL),
        itinerary = itinerary_summary(&ctx.itinerary),
    )
}

/// Restricts the plan to one day when the request names it.
fn day_block(day: Option<u32>) -> String {
    match day {
        Some(day) => format!(
            "TARGET DAY: plan ONLY day {day}. Every item must have \"day\": {day}. Do not touch other days.\n"
        ),
        None => String::new(),
    }
}

pub fn plan_prompt(
    query: &str,
    ctx: &TripContext,
    themes: &[&str],
    day: Option<u32>,
) -> String {
    format!(
        r#"USER REQUEST: {query}

Trip settings:
{context}

{day}{theme}

READ THE USER REQUEST. If it says "adventurous", "romantic", "relaxing" and so on, every activity must match that theme.

RULES:
1. Use GENERIC meal titles: "Breakfast", "Lunch", "Dinner".
2. Choose attractions that MATCH THE REQUESTED THEME.
3. Keep descriptions to at most 5 words.
4. Include 5-6 activities per day covering morning, afternoon and evening.
5. Output ONE JSON object with ALL items for ALL requested days in a single "items" array.
6. Set "replacementStrategy" to "replace".
7. Use "duration" in minutes. startTime/endTime are optional.

OUTPUT FORMAT:
```json
{{
    "action": "add_items",
    "replacementStrategy": "replace",
    "items": [
        {{"title": "Breakfast", "description": "Fuel up", "day": 1, "duration": 60, "location": "Hotel"}}
    ]
}}
```"#,
        context = context_block(ctx),
        day = day_block(day),
        theme = theme_block(themes),
    )
}

/// Whether the request asks to put earlier suggestions on the itinerary.
pub fn wants_previous_options(query: &str) -> bool {
    let lowered = query.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect();
    words.contains(&"add") && (words.contains(&"them") || words.contains(&"itinerary"))
}

pub fn add_options_prompt(query: &str, ctx: &TripContext, history: &[ChatMessage]) -> String {
    format!(
        r#"The user wants to ADD the previous suggestions to the itinerary as OPTIONS TO VOTE ON.

Chat History:
{chat}

Trip settings:
{context}

User Request: {query}

Extract the most recent suggested items from the AI's previous messages in the chat history.

These are MUTUALLY EXCLUSIVE OPTIONS. The group will vote to pick ONE, so every item
MUST share the same day and the same duration.

RULES:
1. ALL items MUST have the SAME day number.
2. ALL items MUST have the SAME duration in minutes.
3. Pick a reasonable evening duration if the context implies evening.
4. Set "replacementStrategy" to "append" and "isOptions" to true.
5. Return ONLY the JSON, nothing before it.

```json
{{
    "action": "add_items",
    "replacementStrategy": "append",
    "isOptions": true,
    "items": [
        {{"title": "Option 1 Name", "description": "Brief description", "day": 1, "duration": 180, "location": "Address"}},
        {{"title": "Option 2 Name", "description": "Brief description", "day": 1, "duration": 180, "location": "Address"}}
    ]
}}
```"#,
        chat = chat_tail(history, CHAT_TAIL),
        context = context_block(ctx),
    )
}

pub fn research_prompt(query: &str, ctx: &TripContext) -> String {
    format!(
        "Search for information related to: {query}\n\n\
         Trip context:\n{context}\n\n\
         Find relevant options for the destination. Include practical details like opening hours, prices, and locations.",
        context = context_block(ctx),
    )
}

pub fn preference_prompt(ctx: &TripContext, history: &[ChatMessage]) -> String {
    let chat = chat_tail(history, CHAT_TAIL);
    let chat = if chat.is_empty() {
        "(no messages yet)".to_string()
    } else {
        chat
    };

    format!(
        r#"Analyze this group chat to understand preferences:

{chat}

Known preferences:
{context}

What does this group like? What should be avoided? Any dietary restrictions? Budget concerns?

If you find NEW preferences that are not already listed, end with a JSON block:
```json
{{
    "action": "update_preferences",
    "preferences": {{
        "dietary": ["Vegan"],
        "interests": ["Hiking"],
        "constraints": ["No stairs"],
        "budget": "Medium"
    }}
}}
```
Merge new findings with existing ones. Only output the JSON if there are NEW findings."#,
        context = context_block(ctx),
    )
}

pub fn planning_prompt(query: &str, ctx: &TripContext) -> String {
    format!(
        r#"Based on the search results and group preferences, create suggestions for: {query}

Existing itinerary:
{itinerary}

Trip settings:
{context}

Create ranked suggestions that:
1. Match group preferences
2. Don't clash with existing itinerary items
3. Account for travel times between locations
4. Are practical given the trip duration and group size

Choose "replacementStrategy":
- "append" if the request asks for more, additional, other or else
- "replace" for instead, change, replace, different, or a new request

Output ONLY the JSON block, no conversational text:
```json
{{
    "action": "add_items",
    "replacementStrategy": "replace",
    "items": [
        {{"title": "Activity Name", "description": "Brief description", "day": 1, "duration": 120, "location": "Address or location name"}}
    ]
}}
```"#,
        itinerary = itinerary_summary(&ctx.itinerary),
        context = context_block(ctx),
    )
}

pub fn full_plan_prompt(ctx: &TripContext, history: &[ChatMessage], scope: &str) -> String {
    format!(
        "Create a complete trip plan for: {scope}\n\n\
         Trip context:\n{context}\n\n\
         Group preferences from chat:\n{chat}\n\n\
         Current itinerary:\n{itinerary}\n\n\
         Create a detailed itinerary with:\n\
         - Specific activities for each time slot\n\
         - Restaurant recommendations for meals\n\
         - Travel time estimates between locations\n\
         - Buffer time for rest\n\
         - A mix of activities based on group preferences",
        context = context_block(ctx),
        chat = chat_tail(history, PLAN_CHAT_TAIL),
        itinerary = itinerary_summary(&ctx.itinerary),
    )
}

/// Reply used instead of a model call when the requested day does not exist.
pub fn invalid_day_reply(day: u32, days_count: u32) -> String {
    let plural = if days_count == 1 { "day" } else { "days" };
    format!(
        "This trip only has {days_count} {plural}, so there is no day {day}. \
         Would you like me to plan something for a day between 1 and {days_count} instead?"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TripSettings;

    fn item(title: &str, day: u32, start: Option<&str>, end: Option<&str>) -> ItineraryItem {
        ItineraryItem {
            title: title.to_string(),
            day: Some(day),
            start_time: start.map(str::to_string),
            end_time: end.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_itinerary_summary_lines() {
        let items = vec![
            item("Breakfast", 1, Some("08:00"), Some("09:00")),
            ItineraryItem {
                duration: Some(120),
                ..item("Beach", 2, None, None)
            },
        ];
        assert_eq!(
            itinerary_summary(&items),
            "Day 1: Breakfast at 08:00-09:00\nDay 2: Beach (120 min)"
        );
        assert_eq!(itinerary_summary(&[]), "No items scheduled yet.");
    }

    #[test]
    fn test_chat_tail_keeps_latest() {
        let history: Vec<ChatMessage> = (0..25)
            .map(|n| ChatMessage::new("Asha", format!("msg {n}")))
            .collect();
        let tail = chat_tail(&history, CHAT_TAIL);
        assert_eq!(tail.lines().count(), 20);
        assert!(tail.starts_with("Asha: msg 5"));
        assert!(tail.ends_with("Asha: msg 24"));
    }

    #[test]
    fn test_target_day_variants() {
        assert_eq!(target_day("plan day 3 please"), Some(3));
        assert_eq!(target_day("Day3 dinner"), Some(3));
        assert_eq!(target_day("DAY 12"), Some(12));
        assert_eq!(target_day("today is sunny"), None);
        assert_eq!(target_day("plan the whole trip"), None);
    }

    #[test]
    fn test_detect_themes() {
        assert_eq!(
            detect_themes("An ADVENTUROUS and romantic trip"),
            vec!["adventurous", "romantic"]
        );
        assert!(detect_themes("plan a trip").is_empty());
        assert!(themed_goal(&["foodie"]).starts_with("Create a FOODIE themed itinerary"));
    }

    #[test]
    fn test_context_block_defaults() {
        let ctx = TripContext {
            settings: TripSettings {
                destination: Some("Andaman".to_string()),
                days_count: Some(4),
                ..Default::default()
            },
            ..Default::default()
        };
        let block = context_block(&ctx);
        assert!(block.contains("Trip Destination: Andaman"));
        assert!(block.contains("Duration: 4 days, Unknown nights"));
        assert!(block.contains("Age Group: mixed"));
        assert!(block.contains("- Budget: Not specified"));
    }

    #[test]
    fn test_invalid_day_reply_names_range() {
        let reply = invalid_day_reply(5, 3);
        assert!(reply.contains("only has 3 days"));
        assert!(reply.contains("between 1 and 3"));
    }

    #[test]
    fn test_plan_prompt_pins_target_day() {
        let ctx = TripContext::default();
        let pinned = plan_prompt("plan day 2", &ctx, &[], Some(2));
        assert!(pinned.contains("plan ONLY day 2"));
        assert!(pinned.contains("Every item must have \"day\": 2"));

        let open = plan_prompt("plan our trip", &ctx, &[], None);
        assert!(!open.contains("TARGET DAY"));
    }

    #[test]
    fn test_wants_previous_options() {
        assert!(wants_previous_options("add them please"));
        assert!(wants_previous_options("Add these to the itinerary"));
        assert!(!wants_previous_options("add a sushi dinner"));
        assert!(!wants_previous_options("show me the itinerary"));
        assert!(!wants_previous_options("add a romantic theme to day 2"));
    }

    #[test]
    fn test_add_options_prompt_carries_history() {
        let history = vec![ChatMessage::new("AI", "1. Fish Market 2. Beach Shack")];
        let prompt = add_options_prompt("add them", &TripContext::default(), &history);
        assert!(prompt.contains("AI: 1. Fish Market 2. Beach Shack"));
        assert!(prompt.contains("\"isOptions\": true"));
        assert!(prompt.contains("\"replacementStrategy\": \"append\""));
    }
}
