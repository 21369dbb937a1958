//! The action-chain engine: resumable multi-step effect sequences.
//!
//! A chain is a deterministic, in-order resolution of queued sub-actions
//! triggered by a turn action (a hero effect, a monster reward). Some
//! steps cannot execute without player input; the chain parks in the
//! registry as **AwaitingInput** and resumes when the input arrives —
//! possibly from an unrelated later request. Completion and failure both
//! remove the chain; already-executed steps stay applied either way
//! (partial chain commit — there is no compensation pass).

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use grimdeck_document::GameDocument;
use grimdeck_protocol::{
    CardId, ChainId, ChainOutcome, ChainStepKind, ChainStepSpec,
    ChainTrigger, ChainView, InputRequest, PlayerId, RoomCode, Zone,
};
use serde::Deserialize;
use serde_json::Value;

use crate::actions::{recruit_hero, transfer};
use crate::turn::deduct_point;
use crate::EngineError;

/// One queued sub-action inside a chain.
#[derive(Debug, Clone)]
struct ChainStep {
    kind: ChainStepKind,
    data: Value,
    requires_input: bool,
    completed: bool,
    input: Option<Value>,
}

impl ChainStep {
    fn from_spec(spec: ChainStepSpec) -> Self {
        // Input-bearing kinds require input no matter what the caller
        // set on the flag.
        let requires_input = spec.requires_input || spec.kind.needs_input();
        Self {
            kind: spec.kind,
            data: spec.data,
            requires_input,
            completed: false,
            input: None,
        }
    }
}

/// An in-flight chain. Owned exclusively by the registry.
#[derive(Debug, Clone)]
struct ActionChain {
    id: ChainId,
    room: RoomCode,
    player: PlayerId,
    trigger: ChainTrigger,
    trigger_data: Value,
    steps: Vec<ChainStep>,
    current_index: usize,
    awaiting_input: bool,
    input_required: Option<InputRequest>,
    created_at: DateTime<Utc>,
    touched_at: DateTime<Utc>,
}

impl ActionChain {
    fn view(&self) -> ChainView {
        ChainView {
            id: self.id.clone(),
            room_id: self.room.clone(),
            player_id: self.player.clone(),
            trigger_type: self.trigger,
            trigger_data: self.trigger_data.clone(),
            current_index: self.current_index,
            awaiting_input: self.awaiting_input,
            input_required: self.input_required.clone(),
            created_at: self.created_at,
        }
    }
}

enum DriveResult {
    Completed,
    Parked(InputRequest),
    Failed(String),
}

#[derive(Default)]
struct Registry {
    chains: HashMap<ChainId, ActionChain>,
    by_room: HashMap<RoomCode, HashSet<ChainId>>,
}

impl Registry {
    fn insert(&mut self, chain: ActionChain) {
        self.by_room
            .entry(chain.room.clone())
            .or_default()
            .insert(chain.id.clone());
        self.chains.insert(chain.id.clone(), chain);
    }

    fn take(&mut self, id: &ChainId) -> Option<ActionChain> {
        let chain = self.chains.remove(id)?;
        if let Some(set) = self.by_room.get_mut(&chain.room) {
            set.remove(id);
            if set.is_empty() {
                self.by_room.remove(&chain.room);
            }
        }
        Some(chain)
    }
}

/// Process-wide registry of in-flight chains.
///
/// Explicitly constructed and injected through server state — never a
/// global. Indexed by chain id and by room code so a room-close event
/// can bulk-remove its chains.
#[derive(Default)]
pub struct ChainRegistry {
    inner: Mutex<Registry>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a chain and synchronously drives it as far as it can go
    /// without blocking on input.
    ///
    /// The caller holds the room's writer lock; step execution mutates
    /// the document directly. Returns the chain result: completed,
    /// failed, or parked awaiting input.
    pub fn start_chain(
        &self,
        doc: &mut GameDocument,
        player: &PlayerId,
        trigger: ChainTrigger,
        steps: Vec<ChainStepSpec>,
        trigger_data: Value,
    ) -> Result<ChainOutcome, EngineError> {
        if doc.player(player).is_none() {
            return Err(EngineError::PlayerNotFound(player.clone()));
        }

        let now = Utc::now();
        let mut chain = ActionChain {
            id: ChainId::mint(&doc.room.code),
            room: doc.room.code.clone(),
            player: player.clone(),
            trigger,
            trigger_data,
            steps: steps.into_iter().map(ChainStep::from_spec).collect(),
            current_index: 0,
            awaiting_input: false,
            input_required: None,
            created_at: now,
            touched_at: now,
        };

        tracing::debug!(
            room = %chain.room,
            chain = %chain.id,
            player = %player,
            steps = chain.steps.len(),
            ?trigger,
            "chain started"
        );

        let result = drive(doc, &mut chain);
        Ok(self.settle(chain, result))
    }

    /// Attaches input to a parked chain's current step and resumes it.
    ///
    /// Steps executed before a later failure stay applied — the chain
    /// contract is partial commit, not transaction.
    pub fn continue_chain(
        &self,
        doc: &mut GameDocument,
        chain_id: &ChainId,
        input: Value,
    ) -> Result<ChainOutcome, EngineError> {
        let mut chain = {
            let mut registry = self.inner.lock().expect("chain registry poisoned");
            {
                let chain = registry
                    .chains
                    .get(chain_id)
                    .ok_or_else(|| EngineError::ChainNotFound(chain_id.clone()))?;
                if !chain.awaiting_input {
                    return Err(EngineError::ChainNotAwaitingInput(
                        chain_id.clone(),
                    ));
                }
            }
            registry.take(chain_id).expect("presence checked above")
        };

        let idx = chain.current_index;
        chain.steps[idx].input = Some(input);
        chain.awaiting_input = false;
        chain.input_required = None;
        chain.touched_at = Utc::now();

        let result = drive(doc, &mut chain);
        Ok(self.settle(chain, result))
    }

    /// Lists parked chains for a player in a room, oldest first — the
    /// reconnect-recovery view.
    pub fn pending_for(
        &self,
        room: &RoomCode,
        player: &PlayerId,
    ) -> Vec<ChainView> {
        let registry = self.inner.lock().expect("chain registry poisoned");
        let mut views: Vec<ChainView> = registry
            .by_room
            .get(room)
            .into_iter()
            .flatten()
            .filter_map(|id| registry.chains.get(id))
            .filter(|c| c.awaiting_input && c.player == *player)
            .map(ActionChain::view)
            .collect();
        views.sort_by_key(|v| v.created_at);
        views
    }

    /// Bulk-removes every chain belonging to a closing room.
    pub fn remove_room(&self, room: &RoomCode) -> usize {
        let mut registry = self.inner.lock().expect("chain registry poisoned");
        let ids: Vec<ChainId> = registry
            .by_room
            .remove(room)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default();
        for id in &ids {
            registry.chains.remove(id);
        }
        if !ids.is_empty() {
            tracing::debug!(room = %room, removed = ids.len(), "room chains removed");
        }
        ids.len()
    }

    /// Expires chains untouched for longer than `ttl`. Expiry is
    /// measured from the last touch (step executed or input received),
    /// so an active-but-slow chain is not cut down mid-flight.
    pub fn sweep(&self, ttl: Duration) -> usize {
        let cutoff = Utc::now() - ttl;
        let mut registry = self.inner.lock().expect("chain registry poisoned");
        let expired: Vec<ChainId> = registry
            .chains
            .values()
            .filter(|c| c.touched_at < cutoff)
            .map(|c| c.id.clone())
            .collect();
        for id in &expired {
            registry.take(id);
        }
        if !expired.is_empty() {
            tracing::info!(expired = expired.len(), "swept stale chains");
        }
        expired.len()
    }

    /// Number of chains currently registered.
    pub fn chain_count(&self) -> usize {
        self.inner.lock().expect("chain registry poisoned").chains.len()
    }

    /// Stores or drops the chain according to the drive result and
    /// builds the wire outcome.
    fn settle(&self, chain: ActionChain, result: DriveResult) -> ChainOutcome {
        match result {
            DriveResult::Completed => {
                tracing::debug!(chain = %chain.id, "chain completed");
                ChainOutcome {
                    chain_id: chain.id,
                    completed: true,
                    failed: false,
                    message: None,
                    requires_input: None,
                }
            }
            DriveResult::Failed(message) => {
                tracing::warn!(
                    chain = %chain.id,
                    room = %chain.room,
                    %message,
                    "chain failed, removed without rollback"
                );
                ChainOutcome {
                    chain_id: chain.id,
                    completed: false,
                    failed: true,
                    message: Some(message),
                    requires_input: None,
                }
            }
            DriveResult::Parked(request) => {
                let outcome = ChainOutcome {
                    chain_id: chain.id.clone(),
                    completed: false,
                    failed: false,
                    message: None,
                    requires_input: Some(request),
                };
                let mut registry =
                    self.inner.lock().expect("chain registry poisoned");
                registry.insert(chain);
                outcome
            }
        }
    }
}

/// Executes steps in order until the chain completes, fails, or reaches
/// a step that needs input it does not have. `current_index` never
/// regresses; a parked chain stays pointed at the blocking step.
fn drive(doc: &mut GameDocument, chain: &mut ActionChain) -> DriveResult {
    while chain.current_index < chain.steps.len() {
        let idx = chain.current_index;

        let blocked = {
            let step = &chain.steps[idx];
            step.requires_input && step.input.is_none()
        };
        if blocked {
            let request = InputRequest {
                step_index: idx,
                kind: chain.steps[idx].kind,
                prompt: prompt_for(chain.steps[idx].kind),
            };
            chain.awaiting_input = true;
            chain.input_required = Some(request.clone());
            return DriveResult::Parked(request);
        }

        let step = chain.steps[idx].clone();
        match execute_step(doc, &chain.player, &step) {
            Ok(()) => {
                chain.steps[idx].completed = true;
                chain.current_index += 1;
                chain.touched_at = Utc::now();
            }
            Err(e) => return DriveResult::Failed(e.to_string()),
        }
    }
    DriveResult::Completed
}

fn prompt_for(kind: ChainStepKind) -> String {
    match kind {
        ChainStepKind::ChooseHero => {
            "choose a hero card from your hand".to_string()
        }
        ChainStepKind::DiscardCard => {
            "choose a card from your hand to discard".to_string()
        }
        other => format!("input required for {other}"),
    }
}

#[derive(Debug, Deserialize)]
struct AmountArgs {
    amount: u32,
}

impl Default for AmountArgs {
    fn default() -> Self {
        Self { amount: 1 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CardArgs {
    card_id: CardId,
}

fn parse_args<T: Default + serde::de::DeserializeOwned>(
    value: &Value,
) -> Result<T, EngineError> {
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value.clone())
        .map_err(|e| EngineError::InvalidInput(e.to_string()))
}

fn required_input<T: serde::de::DeserializeOwned>(
    step: &ChainStep,
) -> Result<T, EngineError> {
    let input = step
        .input
        .as_ref()
        .ok_or_else(|| EngineError::InvalidInput("missing input".into()))?;
    serde_json::from_value(input.clone())
        .map_err(|e| EngineError::InvalidInput(e.to_string()))
}

fn execute_step(
    doc: &mut GameDocument,
    player: &PlayerId,
    step: &ChainStep,
) -> Result<(), EngineError> {
    match step.kind {
        ChainStepKind::DeductPoint => {
            let args: AmountArgs = parse_args(&step.data)?;
            deduct_point(doc, args.amount)?;
        }
        ChainStepKind::DrawCard => {
            let args: AmountArgs = parse_args(&step.data)?;
            transfer(
                doc,
                player,
                args.amount as usize,
                Zone::SupportDeck,
                Zone::OwnHand,
            )?;
        }
        ChainStepKind::ChooseHero => {
            let args: CardArgs = required_input(step)?;
            recruit_hero(doc, player, &args.card_id)?;
        }
        ChainStepKind::DiscardCard => {
            let args: CardArgs = required_input(step)?;
            let entry = doc
                .player_mut(player)
                .ok_or_else(|| EngineError::PlayerNotFound(player.clone()))?;
            let idx = entry
                .hand
                .iter()
                .position(|c| *c == args.card_id)
                .ok_or_else(|| EngineError::UnknownCard(args.card_id.clone()))?;
            let card = entry.hand.remove(idx);
            doc.game_state.discard_pile.push(card);
        }
    }
    Ok(())
}
