use crate::search::SearchParameters;

/// System prompt for the conversational assistant.
pub const CHAT_SYSTEM_PROMPT: &str = "\
You are a helpful flight booking assistant. You can help users find the cheapest flights
between destinations and answer general travel-related questions. Your primary function is
to assist with flight searches, but you can also provide travel tips and information.

When a user asks about finding flights:
1. Extract the origin, destination, and dates from their query
2. If any information is missing, politely ask for it
3. Convert city names to airport codes when needed
4. Use the search_flights function to find flight options

For airport codes, if the user provides a city name instead of an airport code,
use the primary airport code for that city (e.g., \"New York\" -> \"JFK\",
\"San Francisco\" -> \"SFO\").

Common airport codes:
- New York: JFK or LGA
- Los Angeles: LAX
- Chicago: ORD
- San Francisco: SFO
- Miami: MIA
- Dallas: DFW
- Atlanta: ATL
- Boston: BOS
- Seattle: SEA
- Denver: DEN
- Las Vegas: LAS
- London: LHR
- Paris: CDG
- Tokyo: NRT or HND
- Sydney: SYD

When analyzing flight search results:
1. Extract the cheapest flight option (airline, price, times)
2. Identify any layovers or connections
3. Calculate total travel time if available
4. Note any additional fees or restrictions
5. Provide a recommendation based on price and convenience

For general travel questions:
- Provide helpful, accurate information
- If you don't know something, admit it rather than making up information
- Suggest related flight searches when appropriate

Always maintain a helpful, conversational tone and focus on providing accurate,
actionable information. Format your responses in a clear, organized way that's
easy for travelers to understand.

If a search fails, politely ask the user to try again with different parameters.";

/// Behavioral policy handed to the browsing agent alongside every task.
pub const AGENT_POLICY: &str = "\
You are an advanced flight booking assistant with expertise in navigating travel websites,
particularly Kayak.com. Your goal is to find the best flight options based on user
requirements and provide detailed, accurate information.

IMPORTANT GUIDELINES:
- ONLY visit Kayak.com, do not navigate to other websites
- Always clear input fields before entering new information
- Close any popups that appear during the process
- Be thorough in your search but efficient in your actions
- Do not enter any personal information or payment details
- If you encounter an error or unexpected page, try to recover gracefully
- If a search returns no results, note this clearly and suggest possible reasons

SEARCH PROCESS:
1. Navigate to Kayak.com and handle any initial popups or cookie consent requests
2. Select the correct trip type (one-way or round-trip)
3. Enter origin and destination codes, clearing the fields first
4. Set the travel dates using the calendar interface
5. Execute the search and wait for results to load completely
6. Focus on the least expensive options while noting important details

REPORTING STANDARDS:
1. Search parameters summary: airports, dates, trip type
2. Best flight options: airlines, departure/arrival times, total duration,
   stops and their locations, price breakdown, baggage allowance if shown
3. Any notable restrictions, fees, or booking observations
4. Format the report clearly, prioritizing the most important information

Remember to be precise, thorough, and focus only on the flight search task.";

/// Builds the natural-language task script for one search.
pub fn search_task(params: &SearchParameters) -> String {
    let return_step = match params.return_date {
        Some(date) => format!("   - Set return date: {}\n", date),
        None => String::new(),
    };

    format!(
        "Follow these steps precisely to search for flights on Kayak:\n\
         ---IMPORTANT: DO NOT GO TO OTHER WEBSITES OTHER THAN KAYAK.COM---\n\
         ---IMPORTANT: DO NOT CLICK ON the least expensive FLIGHT, JUST SCROLL DOWN---\n\
         \n\
         1. Go to https://www.kayak.com/\n\
         \n\
         2. If any popups appear or cookie consent is requested, close them or accept as appropriate.\n\
         \n\
         --IMPORTANT: CLEAR THE INPUT FIELD BEFORE ENTERING THE ORIGIN AND DESTINATION by clicking on the X button--\n\
         --IMPORTANT: CLOSE ANY POPUPS THAT APPEAR DURING THE PROCESS--\n\
         \n\
         3. Set up the flight search:\n\
            - Select {trip_type} flight\n\
            - Enter origin: {origin}\n\
            - Enter destination: {destination}\n\
            - Set departure date: {departure}. If the month is not visible, click on the next month until you reach it.\n\
         {return_step}\
         \n\
         4. Wait for the results page to load completely and scroll through the cheapest options.\n\
         \n\
         REPORTING:\n\
         Provide a structured description that includes:\n\
         - The flight search parameters used\n\
         - Details of the least expensive flight option found\n\
         - Any additional fees or important notes about the booking process\n\
         - Format the information clearly for easy reading",
        trip_type = params.trip_type(),
        origin = params.origin,
        destination = params.destination,
        departure = params.departure_date,
        return_step = return_step,
    )
}

/// Builds the prompt asking the model to summarize a raw search report.
pub fn analysis_prompt(params: &SearchParameters, details: &str) -> String {
    let return_date = params
        .return_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        "Analyze these flight search results and provide a concise summary:\n\
         \n\
         Search Parameters:\n\
         - Origin: {origin}\n\
         - Destination: {destination}\n\
         - Departure Date: {departure}\n\
         - Return Date: {return_date}\n\
         - Trip Type: {trip_type}\n\
         \n\
         Raw Flight Details:\n\
         {details}\n\
         \n\
         Please extract and summarize:\n\
         1. The cheapest flight option (airline, price, times)\n\
         2. Any layovers or connections\n\
         3. Total travel time if available\n\
         4. Any notable fees or restrictions\n\
         5. Your recommendation based on price and convenience\n\
         \n\
         Format your response in a clear, organized way that's easy for a traveler to understand.",
        origin = params.origin,
        destination = params.destination,
        departure = params.departure_date,
        return_date = return_date,
        trip_type = params.trip_type(),
        details = details,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn round_trip() -> SearchParameters {
        SearchParameters::round_trip(
            "SFO",
            "JFK",
            NaiveDate::from_ymd_opt(2026, 5, 15).unwrap(),
            NaiveDate::from_ymd_opt(2026, 5, 22).unwrap(),
        )
    }

    #[test]
    fn task_includes_parameters_and_trip_type() {
        let task = search_task(&round_trip());
        assert!(task.contains("Enter origin: SFO"));
        assert!(task.contains("Enter destination: JFK"));
        assert!(task.contains("Select round-trip flight"));
        assert!(task.contains("Set return date: 2026-05-22"));
    }

    #[test]
    fn one_way_task_has_no_return_step() {
        let params = SearchParameters::one_way(
            "SFO",
            "JFK",
            NaiveDate::from_ymd_opt(2026, 5, 15).unwrap(),
        );
        let task = search_task(&params);
        assert!(task.contains("Select one-way flight"));
        assert!(!task.contains("Set return date"));
    }

    #[test]
    fn analysis_prompt_embeds_raw_details() {
        let prompt = analysis_prompt(&round_trip(), "Delta, $250, nonstop");
        assert!(prompt.contains("Delta, $250, nonstop"));
        assert!(prompt.contains("- Return Date: 2026-05-22"));
    }
}
