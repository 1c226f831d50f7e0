//! Trigger table
//!
//! Maps normalized chat text to a trigger and carries each prize's amount and
//! eligibility requirement. The set of triggers is fixed; only thresholds and
//! amounts come from configuration.

use crate::gateway::{AdvertisedCommand, Advertisement};

/// Identity of a recognized trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerId {
    Following,
    Leader,
    Proofs,
    Source,
    Pause,
    Resume,
    Help,
}

impl TriggerId {
    pub const ALL: [TriggerId; 7] = [
        TriggerId::Following,
        TriggerId::Leader,
        TriggerId::Proofs,
        TriggerId::Source,
        TriggerId::Pause,
        TriggerId::Resume,
        TriggerId::Help,
    ];

    /// Durable identity, used in claim keys.
    pub fn key(&self) -> &'static str {
        match self {
            TriggerId::Following => "following",
            TriggerId::Leader => "leader",
            TriggerId::Proofs => "proofs",
            TriggerId::Source => "src",
            TriggerId::Pause => "pause",
            TriggerId::Resume => "resume",
            TriggerId::Help => "help",
        }
    }

    /// Phrase users type, after normalization.
    pub fn phrase(&self) -> &'static str {
        match self {
            TriggerId::Following => "i am a follower!",
            TriggerId::Leader => "i am a leader!",
            TriggerId::Proofs => "i have the proof!",
            TriggerId::Source => "i read the source",
            TriggerId::Pause => "pause",
            TriggerId::Resume => "resume",
            TriggerId::Help => "help",
        }
    }

    pub fn from_phrase(normalized: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.phrase() == normalized)
    }
}

impl std::fmt::Display for TriggerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Trim, lowercase and strip one leading `!`.
pub fn normalize(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    match lowered.strip_prefix('!') {
        Some(rest) => rest.to_string(),
        None => lowered,
    }
}

/// Metric a prize requires. All thresholds are inclusive lower bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    None,
    Following { min: u64 },
    Followers { min: u64 },
    Proofs { min: u64 },
}

impl Requirement {
    pub fn needs_profile(&self) -> bool {
        matches!(self, Requirement::Following { .. } | Requirement::Followers { .. })
    }

    pub fn needs_proof_count(&self) -> bool {
        matches!(self, Requirement::Proofs { .. })
    }

    /// Compare an observed value against the threshold.
    ///
    /// The error carries the user-facing shortfall message citing the
    /// threshold and the observed value.
    pub fn check(&self, observed: u64) -> Result<(), String> {
        match *self {
            Requirement::None => Ok(()),
            Requirement::Following { min } if observed < min => Err(format!(
                "You need to follow at least {} others but only have {}. Tragedy.",
                min, observed
            )),
            Requirement::Followers { min } if observed < min => Err(format!(
                "You need at least {} followers but only have {}. Bummer.",
                min, observed
            )),
            Requirement::Proofs { min } if observed < min => Err(format!(
                "You need at least {} proofs but only have {}. Disaster.",
                min, observed
            )),
            _ => Ok(()),
        }
    }
}

/// A prize-paying trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardTrigger {
    pub id: TriggerId,
    pub amount: u64,
    pub requirement: Requirement,
    pub needs_showcase: bool,
    /// Listed in the command advertisement and help text
    pub advertised: bool,
}

impl RewardTrigger {
    pub fn needs_profile(&self) -> bool {
        self.needs_showcase || self.requirement.needs_profile()
    }
}

/// Admin-only run-state commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    Pause,
    Resume,
}

/// Result of looking up normalized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind<'a> {
    Reward(&'a RewardTrigger),
    Admin(AdminCommand),
    Help,
}

pub const DEFAULT_SOURCE_URL: &str = "https://github.com/citizenhacks/hackbot";

/// Thresholds, amounts and showcase identifier.
#[derive(Debug, Clone)]
pub struct RewardSettings {
    pub following_needed: u64,
    pub followers_needed: u64,
    pub proofs_needed: u64,
    pub following_prize: u64,
    pub leader_prize: u64,
    pub proofs_prize: u64,
    pub source_prize: u64,
    pub currency: String,
    pub showcase_team: String,
    /// Where the bot's code lives; named at the end of the help text
    pub source_url: Option<String>,
}

impl Default for RewardSettings {
    fn default() -> Self {
        Self {
            following_needed: 25,
            followers_needed: 25,
            proofs_needed: 5,
            following_prize: 20,
            leader_prize: 100,
            proofs_prize: 50,
            source_prize: 100,
            currency: "XLM".to_string(),
            showcase_team: "citizenhacks.2019".to_string(),
            source_url: Some(DEFAULT_SOURCE_URL.to_string()),
        }
    }
}

/// The fixed trigger set, parameterized by [`RewardSettings`].
#[derive(Debug, Clone)]
pub struct TriggerTable {
    rewards: Vec<RewardTrigger>,
    settings: RewardSettings,
}

impl TriggerTable {
    pub fn new(settings: RewardSettings) -> Self {
        let rewards = vec![
            RewardTrigger {
                id: TriggerId::Following,
                amount: settings.following_prize,
                requirement: Requirement::Following {
                    min: settings.following_needed,
                },
                needs_showcase: false,
                advertised: true,
            },
            RewardTrigger {
                id: TriggerId::Leader,
                amount: settings.leader_prize,
                requirement: Requirement::Followers {
                    min: settings.followers_needed,
                },
                needs_showcase: true,
                advertised: true,
            },
            RewardTrigger {
                id: TriggerId::Proofs,
                amount: settings.proofs_prize,
                requirement: Requirement::Proofs {
                    min: settings.proofs_needed,
                },
                needs_showcase: true,
                advertised: true,
            },
            RewardTrigger {
                id: TriggerId::Source,
                amount: settings.source_prize,
                requirement: Requirement::None,
                needs_showcase: false,
                advertised: false,
            },
        ];
        Self { rewards, settings }
    }

    pub fn showcase_team(&self) -> &str {
        &self.settings.showcase_team
    }

    pub fn currency(&self) -> &str {
        &self.settings.currency
    }

    pub fn reward(&self, id: TriggerId) -> Option<&RewardTrigger> {
        self.rewards.iter().find(|r| r.id == id)
    }

    /// Look up already-normalized text.
    pub fn lookup(&self, normalized: &str) -> Option<TriggerKind<'_>> {
        match TriggerId::from_phrase(normalized)? {
            TriggerId::Pause => Some(TriggerKind::Admin(AdminCommand::Pause)),
            TriggerId::Resume => Some(TriggerKind::Admin(AdminCommand::Resume)),
            TriggerId::Help => Some(TriggerKind::Help),
            id => self.reward(id).map(TriggerKind::Reward),
        }
    }

    /// Phrases of the publicly advertised prizes.
    pub fn public_phrases(&self) -> Vec<&'static str> {
        self.rewards
            .iter()
            .filter(|r| r.advertised)
            .map(|r| r.id.phrase())
            .collect()
    }

    /// Manifest of public commands published to the gateway at startup.
    pub fn advertisement(&self, alias: &str) -> Advertisement {
        let mut commands: Vec<AdvertisedCommand> = self
            .rewards
            .iter()
            .filter(|r| r.advertised)
            .map(|r| AdvertisedCommand {
                name: r.id.phrase().to_string(),
                description: self.describe(r),
            })
            .collect();
        commands.push(AdvertisedCommand {
            name: TriggerId::Help.phrase().to_string(),
            description: "Learn about what I can do.".to_string(),
        });

        Advertisement {
            alias: alias.to_string(),
            visibility: "public".to_string(),
            commands,
        }
    }

    fn describe(&self, reward: &RewardTrigger) -> String {
        let prize = format!("{}{}", reward.amount, self.settings.currency);
        match reward.requirement {
            Requirement::Following { min } => {
                format!("Win {} if you follow at least {} people.", prize, min)
            }
            Requirement::Followers { min } => {
                format!("Win {} if at least {} people follow you.", prize, min)
            }
            Requirement::Proofs { min } => {
                format!("Win {} if you have at least {} proofs.", prize, min)
            }
            Requirement::None => format!("Win {}.", prize),
        }
    }

    /// Payment message; the gateway pays on the trailing `+{amount}{currency}@{recipient}`.
    pub fn payment_text(&self, recipient: &str, flourish: &str, amount: u64) -> String {
        format!(
            "@{}, {} +{}{}@{}",
            recipient, flourish, amount, self.settings.currency, recipient
        )
    }

    pub fn missing_showcase_text(&self) -> String {
        format!(
            "You have to publish your membership in {} first. Go to your profile and edit which teams you have showcased!",
            self.settings.showcase_team
        )
    }

    pub fn help_text(&self, suggested_phrase: &str) -> String {
        let mut help = format!(
            "Greetings! I offer prizes for building out your profile, try `!{}`\n\
             Say `!help` any time to see this again.",
            suggested_phrase
        );
        if let Some(url) = &self.settings.source_url {
            help.push_str("\nYou can check out my insides at ");
            help.push_str(url);
        }
        help
    }
}

impl Default for TriggerTable {
    fn default() -> Self {
        Self::new(RewardSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  I AM A FOLLOWER!  "), "i am a follower!");
        assert_eq!(normalize("!pause"), "pause");
        assert_eq!(normalize("  !Help\n"), "help");
        // only one prefix is stripped
        assert_eq!(normalize("!!pause"), "!pause");
    }

    #[test]
    fn test_lookup() {
        let table = TriggerTable::default();
        match table.lookup("i am a leader!") {
            Some(TriggerKind::Reward(r)) => {
                assert_eq!(r.id, TriggerId::Leader);
                assert_eq!(r.amount, 100);
                assert!(r.needs_showcase);
            }
            other => panic!("unexpected lookup result: {:?}", other),
        }
        assert_eq!(
            table.lookup("pause"),
            Some(TriggerKind::Admin(AdminCommand::Pause))
        );
        assert_eq!(table.lookup("help"), Some(TriggerKind::Help));
        assert_eq!(table.lookup("i am a follower"), None);
        assert_eq!(table.lookup(""), None);
    }

    #[test]
    fn test_requirement_check_is_inclusive() {
        let req = Requirement::Following { min: 25 };
        assert!(req.check(25).is_ok());
        assert!(req.check(30).is_ok());
        let msg = req.check(24).unwrap_err();
        assert!(msg.contains("25"));
        assert!(msg.contains("24"));
        assert!(Requirement::None.check(0).is_ok());
    }

    #[test]
    fn test_proofs_fetch_profile_for_showcase() {
        let table = TriggerTable::default();
        let proofs = table.reward(TriggerId::Proofs).unwrap();
        assert!(proofs.needs_profile());
        assert!(proofs.requirement.needs_proof_count());
        let source = table.reward(TriggerId::Source).unwrap();
        assert!(!source.needs_profile());
    }

    #[test]
    fn test_advertisement_uses_configured_values() {
        let table = TriggerTable::new(RewardSettings {
            following_needed: 10,
            following_prize: 7,
            ..RewardSettings::default()
        });
        let ad = table.advertisement("prizebot");
        assert_eq!(ad.commands.len(), 4);
        assert_eq!(ad.commands[0].name, "i am a follower!");
        assert_eq!(
            ad.commands[0].description,
            "Win 7XLM if you follow at least 10 people."
        );
        assert!(ad.commands.iter().all(|c| c.name != "i read the source"));
    }

    #[test]
    fn test_help_text_names_source() {
        let table = TriggerTable::default();
        let help = table.help_text("i am a leader!");
        assert!(help.starts_with("Greetings!"));
        assert!(help.contains("try `!i am a leader!`"));
        assert!(help.ends_with("You can check out my insides at https://github.com/citizenhacks/hackbot"));

        let table = TriggerTable::new(RewardSettings {
            source_url: None,
            ..RewardSettings::default()
        });
        assert!(!table.help_text("help").contains("insides"));
    }

    #[test]
    fn test_payment_text() {
        let table = TriggerTable::default();
        assert_eq!(
            table.payment_text("alice", "success!", 20),
            "@alice, success! +20XLM@alice"
        );
    }
}
