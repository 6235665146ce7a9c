//! Static destination knowledge: alias lookup, activity templates and mock
//! flight options.

/// Alias → canonical destination. Lookup walks this table in order and the
/// first alias found anywhere in the message wins, so multi-word and more
/// specific aliases sit above the ones they contain.
pub const DESTINATION_ALIASES: &[(&str, &str)] = &[
    ("new york", "new york"),
    ("nyc", "new york"),
    ("manhattan", "new york"),
    ("new delhi", "delhi"),
    ("mexico city", "mexico city"),
    ("hong kong", "hong kong"),
    ("los angeles", "los angeles"),
    ("hollywood", "los angeles"),
    ("san francisco", "san francisco"),
    ("las vegas", "las vegas"),
    ("buenos aires", "buenos aires"),
    ("rio de janeiro", "rio de janeiro"),
    ("cape town", "cape town"),
    ("south africa", "cape town"),
    ("new zealand", "auckland"),
    ("paris", "paris"),
    ("france", "paris"),
    ("eiffel", "paris"),
    ("london", "london"),
    ("england", "london"),
    ("britain", "london"),
    ("rome", "rome"),
    ("italy", "rome"),
    ("venice", "venice"),
    ("florence", "florence"),
    ("milan", "milan"),
    ("tokyo", "tokyo"),
    ("kyoto", "kyoto"),
    ("japan", "tokyo"),
    ("barcelona", "barcelona"),
    ("madrid", "madrid"),
    ("spain", "barcelona"),
    ("amsterdam", "amsterdam"),
    ("netherlands", "amsterdam"),
    ("holland", "amsterdam"),
    ("berlin", "berlin"),
    ("germany", "berlin"),
    ("lisbon", "lisbon"),
    ("portugal", "lisbon"),
    ("prague", "prague"),
    ("czech", "prague"),
    ("vienna", "vienna"),
    ("austria", "vienna"),
    ("budapest", "budapest"),
    ("hungary", "budapest"),
    ("athens", "athens"),
    ("greece", "athens"),
    ("istanbul", "istanbul"),
    ("turkey", "istanbul"),
    ("dublin", "dublin"),
    ("ireland", "dublin"),
    ("edinburgh", "edinburgh"),
    ("scotland", "edinburgh"),
    ("copenhagen", "copenhagen"),
    ("denmark", "copenhagen"),
    ("stockholm", "stockholm"),
    ("sweden", "stockholm"),
    ("oslo", "oslo"),
    ("norway", "oslo"),
    ("reykjavik", "reykjavik"),
    ("iceland", "reykjavik"),
    ("zurich", "zurich"),
    ("switzerland", "zurich"),
    ("dubai", "dubai"),
    ("cairo", "cairo"),
    ("egypt", "cairo"),
    ("marrakech", "marrakech"),
    ("marrakesh", "marrakech"),
    ("morocco", "marrakech"),
    ("nairobi", "nairobi"),
    ("kenya", "nairobi"),
    ("bangkok", "bangkok"),
    ("thailand", "bangkok"),
    ("bali", "bali"),
    ("indonesia", "bali"),
    ("singapore", "singapore"),
    ("hanoi", "hanoi"),
    ("vietnam", "hanoi"),
    ("seoul", "seoul"),
    ("korea", "seoul"),
    ("beijing", "beijing"),
    ("shanghai", "shanghai"),
    ("china", "beijing"),
    ("mumbai", "mumbai"),
    ("bombay", "mumbai"),
    ("delhi", "delhi"),
    ("india", "delhi"),
    ("sydney", "sydney"),
    ("australia", "sydney"),
    ("auckland", "auckland"),
    ("honolulu", "honolulu"),
    ("hawaii", "honolulu"),
    ("miami", "miami"),
    ("chicago", "chicago"),
    ("vegas", "las vegas"),
    ("toronto", "toronto"),
    ("vancouver", "vancouver"),
    ("canada", "toronto"),
    ("cancun", "cancun"),
    ("mexico", "mexico city"),
    ("brazil", "rio de janeiro"),
    ("argentina", "buenos aires"),
    ("peru", "lima"),
];

/// Words never taken as a destination by the first-long-word fallback.
pub const DESTINATION_STOP_WORDS: &[&str] = &[
    "plan", "trip", "visit", "travel", "days", "under", "with", "budget",
    // question and filler words
    "what", "whats", "where", "when", "which", "that", "this", "there", "then", "they",
    "have", "will", "would", "could", "should", "want", "like", "need", "help", "please",
    "tell", "show", "give", "find", "about", "from", "into", "some", "your", "going", "hello",
    "thanks", "thank", "good", "great", "today", "tomorrow", "week", "weeks", "month",
    "months", "around", "cheap", "best", "also", "maybe", "just",
    // intent vocabulary
    "weather", "temperature", "forecast", "flight", "flights", "ticket", "tickets", "book",
    "booking", "airline", "airlines", "itinerary", "schedule", "vacation", "holiday",
];

/// Activity templates for the best-known destinations.
pub const DESTINATION_ACTIVITIES: &[(&str, &[&str])] = &[
    (
        "paris",
        &[
            "Eiffel Tower at opening time, then a Seine river cruise",
            "Louvre Museum in the morning, Tuileries Garden stroll after lunch",
            "Montmartre and Sacré-Cœur, dinner in a neighbourhood bistro",
            "Day trip to the Palace of Versailles",
            "Musée d'Orsay and Saint-Germain cafés",
            "Le Marais boutiques and Place des Vosges",
            "Latin Quarter, Notre-Dame exterior and a farewell dinner cruise",
        ],
    ),
    (
        "london",
        &[
            "Tower of London and a walk across Tower Bridge",
            "British Museum, then Covent Garden in the evening",
            "Westminster Abbey, Big Ben and the London Eye",
            "Camden Market and a Regent's Canal walk",
            "Day trip to Windsor Castle",
            "Tate Modern and Borough Market along the South Bank",
            "Notting Hill, Hyde Park and a West End show",
        ],
    ),
    (
        "rome",
        &[
            "Colosseum and the Roman Forum",
            "Vatican Museums and St. Peter's Basilica",
            "Trevi Fountain, Pantheon and Piazza Navona",
            "Trastevere food walk",
            "Villa Borghese gardens and gallery",
            "Day trip to Tivoli villas",
            "Spanish Steps and a final evening aperitivo",
        ],
    ),
    (
        "tokyo",
        &[
            "Senso-ji temple in Asakusa and a Sumida river walk",
            "Shibuya crossing and Harajuku's Takeshita Street",
            "Tsukiji outer market breakfast, then Ginza",
            "Meiji Shrine and Yoyogi Park",
            "Day trip to Nikko or Kamakura",
            "Akihabara and an evening in Shinjuku",
            "teamLab digital art museum and Odaiba bay",
        ],
    ),
    (
        "new york",
        &[
            "Central Park and the Metropolitan Museum of Art",
            "Statue of Liberty and Ellis Island ferry",
            "High Line, Chelsea Market and Hudson Yards",
            "Brooklyn Bridge walk and DUMBO",
            "Museum of Modern Art and Fifth Avenue",
            "Greenwich Village and SoHo",
            "Top of the Rock at sunset and a Broadway show",
        ],
    ),
    (
        "barcelona",
        &[
            "Sagrada Família and Hospital de Sant Pau",
            "Gothic Quarter and the cathedral",
            "Park Güell and Gràcia squares",
            "La Boqueria market and La Rambla",
            "Barceloneta beach afternoon",
            "Montjuïc castle and the Magic Fountain",
            "Day trip to Montserrat",
        ],
    ),
    (
        "amsterdam",
        &[
            "Rijksmuseum and Museumplein",
            "Anne Frank House and a Jordaan walk",
            "Canal cruise through the ring of canals",
            "Van Gogh Museum and Vondelpark",
            "Bike ride to the windmills of Zaanse Schans",
            "De Pijp and the Albert Cuyp market",
            "NDSM wharf and an evening on the IJ",
        ],
    ),
    (
        "bangkok",
        &[
            "Grand Palace and Wat Pho",
            "Wat Arun and a Chao Phraya river boat",
            "Chatuchak weekend market",
            "Floating market day trip",
            "Jim Thompson House and Siam shopping",
            "Chinatown street food night",
            "Day trip to Ayutthaya ruins",
        ],
    ),
    (
        "bali",
        &[
            "Ubud Monkey Forest and rice terraces",
            "Sunrise trek on Mount Batur",
            "Uluwatu temple and a kecak fire dance",
            "Snorkelling off Nusa Penida",
            "Tanah Lot temple at sunset",
            "Seminyak beach clubs",
            "Balinese cooking class",
        ],
    ),
    (
        "dubai",
        &[
            "Burj Khalifa observation deck and Dubai Mall",
            "Desert safari with dinner",
            "Old Dubai souks and an abra across the creek",
            "Palm Jumeirah and Atlantis",
            "Dubai Frame and Zabeel Park",
            "Jumeirah beach and Madinat souk",
            "Day trip to Abu Dhabi's Sheikh Zayed Mosque",
        ],
    ),
];

/// Template for destinations without a dedicated entry.
pub const GENERIC_ACTIVITIES: &[&str] = &[
    "Arrive, check in and explore the neighbourhood around your stay",
    "Guided walking tour of the historic centre",
    "Visit the main museum or landmark",
    "Local market and a food tasting",
    "Day trip to a nearby natural site",
    "Free day for shopping or relaxing",
    "Farewell dinner at a well-reviewed local restaurant",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightOption {
    pub airline: &'static str,
    pub departs: &'static str,
    pub duration: &'static str,
    pub stops: u8,
    pub price: u32,
}

pub const MOCK_FLIGHT_OPTIONS: &[FlightOption] = &[
    FlightOption {
        airline: "SkyWays",
        departs: "08:15",
        duration: "2h 10m",
        stops: 0,
        price: 189,
    },
    FlightOption {
        airline: "AeroLink",
        departs: "13:40",
        duration: "3h 05m",
        stops: 1,
        price: 142,
    },
    FlightOption {
        airline: "BlueJet",
        departs: "19:55",
        duration: "2h 25m",
        stops: 0,
        price: 215,
    },
];

/// First alias contained in `lower` (already lowercased), in table order.
pub fn lookup_destination(lower: &str) -> Option<&'static str> {
    DESTINATION_ALIASES
        .iter()
        .find(|(alias, _)| lower.contains(alias))
        .map(|(_, canonical)| *canonical)
}

pub fn activities_for(destination: &str) -> &'static [&'static str] {
    DESTINATION_ACTIVITIES
        .iter()
        .find(|(name, _)| *name == destination)
        .map(|(_, activities)| *activities)
        .unwrap_or(GENERIC_ACTIVITIES)
}

pub fn is_stop_word(word: &str) -> bool {
    DESTINATION_STOP_WORDS.contains(&word)
}

/// "new york" -> "New York".
pub fn display_name(destination: &str) -> String {
    destination
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
