use crate::{
    CipherState, DhState, HandshakePattern, HandshakeToken, NoiseError, PatternFlags, ProtocolId,
    SymmetricState, MAX_MESSAGE_LEN, PSK_LEN,
};
use ne_crypto::{HashBuf, RandomState, MAX_DH_LEN};
use zeroize::Zeroize;

// Outstanding requirements, cleared as the application supplies them or `start` consumes them.
const REQ_LOCAL_REQUIRED: u8 = 1 << 0;
const REQ_REMOTE_REQUIRED: u8 = 1 << 1;
const REQ_PSK: u8 = 1 << 2;
const REQ_PROLOGUE: u8 = 1 << 3;
const REQ_FALLBACK_EPHEM: u8 = 1 << 4;
const REQ_LOCAL_PREMSG: u8 = 1 << 5;
const REQ_REMOTE_PREMSG: u8 = 1 << 6;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Role {
    Initiator,
    Responder,
}

/// What the application should do next.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Action {
    /// Not started yet, keys and prologue may still be supplied
    None,
    WriteMessage,
    ReadMessage,
    /// Terminal, the state must be discarded (or passed to `fallback`)
    Failed,
    /// The pattern is exhausted, call `split`
    Split,
    /// `split` has been called
    Complete,
}

#[derive(Copy, Clone)]
enum Key {
    Static,
    Ephemeral,
}

pub struct HandshakeState {
    id: ProtocolId,
    role: Role,
    action: Action,
    requirements: u8,
    cursor: usize,
    symmetric: SymmetricState,
    local_static: Option<DhState>,
    local_ephemeral: Option<DhState>,
    remote_static: Option<DhState>,
    remote_ephemeral: Option<DhState>,
    rng: RandomState,
    handshake_hash: HashBuf,
}

impl HandshakeState {
    /// New handshake drawing ephemeral keys from an OS seeded `RandomState`.
    pub fn new(id: ProtocolId, role: Role) -> Result<Self, NoiseError> {
        Ok(Self::with_random_state(id, role, RandomState::new()?))
    }

    pub fn new_by_name(name: &str, role: Role) -> Result<Self, NoiseError> {
        Self::new(name.parse()?, role)
    }

    pub fn with_random_state(id: ProtocolId, role: Role, rng: RandomState) -> Self {
        let mut state = Self {
            id,
            role,
            action: Action::None,
            requirements: 0,
            cursor: 0,
            symmetric: SymmetricState::initialize_symmetric(id),
            local_static: None,
            local_ephemeral: None,
            remote_static: None,
            remote_ephemeral: None,
            rng,
            handshake_hash: HashBuf::new(0),
        };
        state.reset_slots(None, None);
        state
    }

    fn flags(&self) -> PatternFlags {
        self.id.pattern.flags_for(self.role == Role::Initiator)
    }

    /// Creates the key slots the pattern uses for this role and recomputes requirements.
    /// `local_static` and `ephemeral` carry keys over from an abandoned handshake.
    fn reset_slots(&mut self, local_static: Option<DhState>, ephemeral: Option<DhState>) {
        let flags = self.flags();
        let dh = self.id.dh;
        let slot = |flag: PatternFlags| flags.contains(flag).then(|| DhState::new(dh));

        self.local_static = match flags.contains(PatternFlags::LOCAL_STATIC) {
            true => Some(local_static.unwrap_or_else(|| DhState::new(dh))),
            false => None,
        };
        self.local_ephemeral = slot(PatternFlags::LOCAL_EPHEMERAL);
        self.remote_static = slot(PatternFlags::REMOTE_STATIC);
        self.remote_ephemeral = slot(PatternFlags::REMOTE_EPHEMERAL);
        if let Some(ephemeral) = ephemeral {
            if flags.contains(PatternFlags::LOCAL_EPHEM_REQ) {
                self.local_ephemeral = Some(ephemeral);
            } else if flags.contains(PatternFlags::REMOTE_EPHEM_REQ) {
                self.remote_ephemeral = Some(ephemeral);
            }
        }

        let mut requirements = REQ_PROLOGUE;
        if flags.contains(PatternFlags::LOCAL_STATIC) {
            requirements |= REQ_LOCAL_REQUIRED;
        }
        if flags.contains(PatternFlags::LOCAL_REQUIRED) {
            requirements |= REQ_LOCAL_PREMSG;
        }
        if flags.contains(PatternFlags::REMOTE_REQUIRED) {
            requirements |= REQ_REMOTE_REQUIRED | REQ_REMOTE_PREMSG;
        }
        if flags.contains(PatternFlags::LOCAL_EPHEM_REQ)
            || flags.contains(PatternFlags::REMOTE_EPHEM_REQ)
        {
            requirements |= REQ_FALLBACK_EPHEM;
        }
        if self.id.is_psk() {
            requirements |= REQ_PSK;
        }
        self.requirements = requirements;
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn protocol_id(&self) -> ProtocolId {
        self.id
    }

    pub fn needs_local_keypair(&self) -> bool {
        self.requirements & REQ_LOCAL_REQUIRED != 0 && !self.has_local_keypair()
    }

    pub fn has_local_keypair(&self) -> bool {
        self.local_static.as_ref().is_some_and(|s| s.has_keypair())
    }

    pub fn needs_remote_public_key(&self) -> bool {
        self.requirements & REQ_REMOTE_REQUIRED != 0 && !self.has_remote_public_key()
    }

    pub fn has_remote_public_key(&self) -> bool {
        self.remote_static.as_ref().is_some_and(|rs| rs.has_public_key())
    }

    pub fn needs_pre_shared_key(&self) -> bool {
        self.requirements & REQ_PSK != 0
    }

    /// The local static key slot, if the pattern uses one. Only mutable before `start`.
    pub fn local_keypair_mut(&mut self) -> Option<&mut DhState> {
        match self.action {
            Action::None => self.local_static.as_mut(),
            _ => None,
        }
    }

    /// The remote static key slot, when the pattern needs it in advance. Only mutable before `start`.
    pub fn remote_public_key_mut(&mut self) -> Option<&mut DhState> {
        match (self.action, self.requirements & REQ_REMOTE_REQUIRED != 0) {
            (Action::None, true) => self.remote_static.as_mut(),
            _ => None,
        }
    }

    /// The local ephemeral slot, so known-answer tests can pin the key an `e` token sends.
    /// Only available before `start`; a slot left empty is filled from the `RandomState`.
    pub fn fixed_ephemeral_mut(&mut self) -> Option<&mut DhState> {
        match self.action {
            Action::None => self.local_ephemeral.as_mut(),
            _ => None,
        }
    }

    /// The peer's static key, once known, for the application's authorisation decision.
    pub fn remote_public_key(&self) -> Option<&DhState> {
        self.remote_static.as_ref().filter(|rs| rs.has_public_key())
    }

    /// The transcript hash for channel binding. Still available after `split`.
    pub fn handshake_hash(&self) -> &[u8] {
        match self.action {
            Action::Complete => self.handshake_hash.as_slice(),
            _ => self.symmetric.handshake_hash(),
        }
    }

    pub fn set_prologue(&mut self, prologue: &[u8]) -> Result<(), NoiseError> {
        if self.action != Action::None || self.requirements & REQ_PROLOGUE == 0 {
            Err(NoiseError::InvalidState)?
        }
        self.symmetric.mix_hash(prologue);
        self.requirements &= !REQ_PROLOGUE;
        Ok(())
    }

    /// Mixes the pre-shared key. An empty prologue is assumed if none was set.
    pub fn set_pre_shared_key(&mut self, key: &[u8]) -> Result<(), NoiseError> {
        if self.action != Action::None {
            Err(NoiseError::InvalidState)?
        }
        if !self.id.is_psk() {
            Err(NoiseError::NotApplicable)?
        }
        if key.len() != PSK_LEN {
            Err(NoiseError::InvalidLength)?
        }
        if self.requirements & REQ_PSK == 0 {
            Err(NoiseError::InvalidState)?
        }
        if self.requirements & REQ_PROLOGUE != 0 {
            self.set_prologue(&[])?;
        }
        self.symmetric.mix_key_and_hash(key)?;
        self.requirements &= !REQ_PSK;
        Ok(())
    }

    /// Checks that everything the pattern needs has been supplied, mixes the pre-messages and
    /// hands the first message to whichever side sends it.
    pub fn start(&mut self) -> Result<(), NoiseError> {
        if self.action != Action::None {
            Err(NoiseError::InvalidState)?
        }
        if self.requirements & REQ_LOCAL_REQUIRED != 0 && !self.has_local_keypair() {
            Err(NoiseError::LocalKeyRequired)?
        }
        if self.requirements & REQ_REMOTE_REQUIRED != 0 && !self.has_remote_public_key() {
            Err(NoiseError::RemoteKeyRequired)?
        }
        if self.requirements & REQ_FALLBACK_EPHEM != 0 {
            let flags = self.flags();
            if flags.contains(PatternFlags::LOCAL_EPHEM_REQ)
                && !self.local_ephemeral.as_ref().is_some_and(|e| e.has_keypair())
            {
                Err(NoiseError::LocalKeyRequired)?
            }
            if flags.contains(PatternFlags::REMOTE_EPHEM_REQ)
                && !self.remote_ephemeral.as_ref().is_some_and(|re| re.has_public_key())
            {
                Err(NoiseError::RemoteKeyRequired)?
            }
        }
        if self.requirements & REQ_PSK != 0 {
            Err(NoiseError::PskRequired)?
        }
        if self.requirements & REQ_PROLOGUE != 0 {
            self.set_prologue(&[])?;
        }

        // The initiator's pre-message is hashed first.
        match self.role {
            Role::Initiator => {
                self.mix_premessage(true, PatternFlags::LOCAL_EPHEM_REQ, PatternFlags::LOCAL_REQUIRED)?;
                self.mix_premessage(false, PatternFlags::REMOTE_EPHEM_REQ, PatternFlags::REMOTE_REQUIRED)?;
            }
            Role::Responder => {
                self.mix_premessage(false, PatternFlags::REMOTE_EPHEM_REQ, PatternFlags::REMOTE_REQUIRED)?;
                self.mix_premessage(true, PatternFlags::LOCAL_EPHEM_REQ, PatternFlags::LOCAL_REQUIRED)?;
            }
        }
        self.requirements &= !(REQ_LOCAL_PREMSG | REQ_REMOTE_PREMSG | REQ_FALLBACK_EPHEM);

        self.action = match self.role {
            Role::Initiator => Action::WriteMessage,
            Role::Responder => Action::ReadMessage,
        };
        while self.id.pattern.tokens()[self.cursor] == HandshakeToken::FlipDir {
            self.flip_direction();
        }
        tracing::debug!(protocol = %self.id, role = ?self.role, "handshake started");
        Ok(())
    }

    /// Hashes one side's pre-message public keys, ephemeral before static.
    fn mix_premessage(
        &mut self,
        local: bool,
        ephemeral_flag: PatternFlags,
        static_flag: PatternFlags,
    ) -> Result<(), NoiseError> {
        let flags = self.flags();
        if flags.contains(ephemeral_flag) {
            let ephemeral = match local {
                true => self.local_ephemeral.as_ref(),
                false => self.remote_ephemeral.as_ref(),
            };
            let public = ephemeral.ok_or(NoiseError::NotSet)?.public_key()?;
            self.symmetric.mix_hash(public);
            if self.id.is_psk() {
                self.symmetric.mix_key(public)?;
            }
        }
        if flags.contains(static_flag) {
            let static_key = match local {
                true => self.local_static.as_ref(),
                false => self.remote_static.as_ref(),
            };
            let public = static_key.ok_or(NoiseError::NotSet)?.public_key()?;
            self.symmetric.mix_hash(public);
        }
        Ok(())
    }

    fn flip_direction(&mut self) {
        self.cursor += 1;
        self.action = match self.action {
            Action::WriteMessage => Action::ReadMessage,
            Action::ReadMessage => Action::WriteMessage,
            other => other,
        };
    }

    fn fail(&mut self, error: &NoiseError) {
        self.action = Action::Failed;
        tracing::debug!(protocol = %self.id, role = ?self.role, %error, "handshake failed");
    }

    /// Produces the next handshake message carrying `payload`.
    pub fn write_message(&mut self, payload: &[u8]) -> Result<Vec<u8>, NoiseError> {
        if self.action != Action::WriteMessage {
            Err(NoiseError::InvalidState)?
        }
        if payload.len() > MAX_MESSAGE_LEN {
            Err(NoiseError::InvalidLength)?
        }
        match self.write_tokens(payload) {
            Ok(message) => {
                tracing::trace!(role = ?self.role, len = message.len(), "handshake message written");
                Ok(message)
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    fn write_tokens(&mut self, payload: &[u8]) -> Result<Vec<u8>, NoiseError> {
        let mut message = Vec::new();
        loop {
            match self.id.pattern.tokens()[self.cursor] {
                HandshakeToken::E => {
                    // Sets e to GENERATE_KEYPAIR() unless one was carried over.
                    let e = self.local_ephemeral.as_mut().ok_or(NoiseError::NotSet)?;
                    if !e.has_keypair() {
                        e.generate_keypair(&mut self.rng)?;
                    }

                    // Appends e.public_key to the buffer.
                    let public = e.public_key()?;
                    message.extend_from_slice(public);

                    // Calls MixHash(e.public_key), and MixKey(e.public_key) with a PSK.
                    self.symmetric.mix_hash(public);
                    if self.id.is_psk() {
                        self.symmetric.mix_key(public)?;
                    }
                }
                HandshakeToken::S => {
                    // Appends EncryptAndHash(s.public_key) to the buffer.
                    let s = self.local_static.as_ref().ok_or(NoiseError::LocalKeyRequired)?;
                    if !s.has_keypair() {
                        Err(NoiseError::LocalKeyRequired)?
                    }
                    let ciphertext = self.symmetric.encrypt_and_hash(s.public_key()?)?;
                    message.extend_from_slice(&ciphertext);
                }
                HandshakeToken::FlipDir => {
                    self.flip_direction();
                    break;
                }
                HandshakeToken::End => {
                    self.action = Action::Split;
                    break;
                }
                dh => self.mix_dh(dh)?,
            }
            self.cursor += 1;
        }

        // Appends EncryptAndHash(payload) to the buffer.
        let ciphertext = self.symmetric.encrypt_and_hash(payload)?;
        message.extend_from_slice(&ciphertext);
        if message.len() > MAX_MESSAGE_LEN {
            Err(NoiseError::InvalidLength)?
        }
        Ok(message)
    }

    /// Consumes the next handshake message, returning its payload.
    pub fn read_message(&mut self, message: &[u8]) -> Result<Vec<u8>, NoiseError> {
        if self.action != Action::ReadMessage {
            Err(NoiseError::InvalidState)?
        }
        if message.len() > MAX_MESSAGE_LEN {
            Err(NoiseError::InvalidLength)?
        }
        match self.read_tokens(message) {
            Ok(payload) => {
                tracing::trace!(role = ?self.role, len = message.len(), "handshake message read");
                Ok(payload)
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    fn read_tokens(&mut self, message: &[u8]) -> Result<Vec<u8>, NoiseError> {
        let dh_len = self.id.dh.public_key_len();
        let mut head = 0;
        loop {
            match self.id.pattern.tokens()[self.cursor] {
                HandshakeToken::E => {
                    // Sets re (which must be empty) to the next DHLEN bytes from the message.
                    let public = take(message, &mut head, dh_len)?;
                    let re = self.remote_ephemeral.as_mut().ok_or(NoiseError::NotSet)?;
                    if re.has_public_key() {
                        Err(NoiseError::InvalidState)?
                    }
                    re.set_public_key(public)?;

                    // Calls MixHash(re.public_key), and MixKey(re.public_key) with a PSK.
                    self.symmetric.mix_hash(public);
                    if self.id.is_psk() {
                        self.symmetric.mix_key(public)?;
                    }
                }
                HandshakeToken::S => {
                    // Takes DHLEN + 16 bytes if HasKey() == True, or DHLEN bytes otherwise.
                    let len = match self.symmetric.has_key() {
                        true => dh_len + self.symmetric.mac_len(),
                        false => dh_len,
                    };
                    let temp = take(message, &mut head, len)?;
                    let rs = self.remote_static.as_ref().ok_or(NoiseError::NotSet)?;
                    if rs.has_public_key() {
                        Err(NoiseError::InvalidState)?
                    }

                    // Sets rs to DecryptAndHash(temp).
                    let mut public = self.symmetric.decrypt_and_hash(temp)?;
                    let result = self
                        .remote_static
                        .as_mut()
                        .ok_or(NoiseError::NotSet)
                        .and_then(|rs| rs.set_public_key(&public));
                    public.zeroize();
                    result?;
                }
                HandshakeToken::FlipDir => {
                    self.flip_direction();
                    break;
                }
                HandshakeToken::End => {
                    self.action = Action::Split;
                    break;
                }
                dh => self.mix_dh(dh)?,
            }
            self.cursor += 1;
        }

        // Calls DecryptAndHash() on the remaining bytes of the message.
        self.symmetric.decrypt_and_hash(&message[head..])
    }

    /// Calls MixKey(DH(..)) with the pairing the token names for this role.
    fn mix_dh(&mut self, token: HandshakeToken) -> Result<(), NoiseError> {
        let initiator = self.role == Role::Initiator;
        let (local, remote) = match token {
            HandshakeToken::DhEE => (Key::Ephemeral, Key::Ephemeral),
            // DH(e, rs) for the initiator, DH(s, re) for the responder.
            HandshakeToken::DhES if initiator => (Key::Ephemeral, Key::Static),
            HandshakeToken::DhES => (Key::Static, Key::Ephemeral),
            // DH(s, re) for the initiator, DH(e, rs) for the responder.
            HandshakeToken::DhSE if initiator => (Key::Static, Key::Ephemeral),
            HandshakeToken::DhSE => (Key::Ephemeral, Key::Static),
            HandshakeToken::DhSS => (Key::Static, Key::Static),
            _ => Err(NoiseError::InvalidState)?,
        };
        let local = match local {
            Key::Static => self.local_static.as_ref(),
            Key::Ephemeral => self.local_ephemeral.as_ref(),
        }
        .ok_or(NoiseError::NotSet)?;
        let remote = match remote {
            Key::Static => self.remote_static.as_ref(),
            Key::Ephemeral => self.remote_ephemeral.as_ref(),
        }
        .ok_or(NoiseError::NotSet)?;

        let mut shared = [0u8; MAX_DH_LEN];
        let len = local.shared_key_len();
        let result = local
            .calculate(remote, &mut shared)
            .and_then(|_| self.symmetric.mix_key(&shared[..len]));
        shared.zeroize();
        result
    }

    /// Derives the transport ciphers as `(send, receive)`.
    /// For one-way patterns the unused direction comes back without a key.
    pub fn split(&mut self) -> Result<(CipherState, CipherState), NoiseError> {
        if self.action != Action::Split {
            Err(NoiseError::InvalidState)?
        }
        self.handshake_hash = HashBuf::from_slice(self.symmetric.handshake_hash());
        let (c1, c2) = match self.symmetric.split() {
            Ok(ciphers) => ciphers,
            Err(e) => {
                self.fail(&e);
                return Err(e);
            }
        };
        self.action = Action::Complete;
        tracing::debug!(protocol = %self.id, role = ?self.role, "handshake split");

        let unkeyed = || CipherState::new(self.id.cipher);
        Ok(match (self.id.pattern.is_one_way(), self.role) {
            (true, Role::Initiator) => (c1, unkeyed()),
            (true, Role::Responder) => (unkeyed(), c1),
            (false, Role::Initiator) => (c1, c2),
            (false, Role::Responder) => (c2, c1),
        })
    }

    /// Restarts a failed handshake as `XXfallback`.
    pub fn fallback(&mut self) -> Result<(), NoiseError> {
        self.fallback_to(HandshakePattern::XXfallback)
    }

    /// Re-initializes onto `pattern`, keeping the local static key and the initiator's
    /// ephemeral as a pre-message. Roles are unchanged; call `start` again afterwards.
    ///
    /// Allowed once the handshake has failed, or for an initiator still waiting on a reply.
    pub fn fallback_to(&mut self, pattern: HandshakePattern) -> Result<(), NoiseError> {
        let allowed = match (self.action, self.role) {
            (Action::Failed, _) => true,
            (Action::ReadMessage, Role::Initiator) => true,
            _ => false,
        };
        if !allowed {
            Err(NoiseError::InvalidState)?
        }
        if !pattern.is_fallback() {
            Err(NoiseError::NotApplicable)?
        }
        let has_ephemeral = match self.role {
            Role::Initiator => self.local_ephemeral.as_ref().is_some_and(|e| e.has_keypair()),
            Role::Responder => self.remote_ephemeral.as_ref().is_some_and(|re| re.has_public_key()),
        };
        if !has_ephemeral {
            Err(NoiseError::InvalidState)?
        }
        let ephemeral = match self.role {
            Role::Initiator => self.local_ephemeral.take(),
            Role::Responder => self.remote_ephemeral.take(),
        };

        let previous = self.id.pattern;
        self.id = self.id.with_pattern(pattern);
        self.symmetric = SymmetricState::initialize_symmetric(self.id);
        let local_static = self.local_static.take();
        self.reset_slots(local_static, ephemeral);
        self.cursor = 0;
        self.action = Action::None;
        tracing::debug!(
            protocol = %self.id,
            role = ?self.role,
            from = previous.name(),
            "handshake fell back"
        );
        Ok(())
    }
}

/// The next `len` bytes of `message` after `head`, or `InvalidLength` if it runs short.
fn take<'a>(message: &'a [u8], head: &mut usize, len: usize) -> Result<&'a [u8], NoiseError> {
    if message.len() - *head < len {
        Err(NoiseError::InvalidLength)?
    }
    *head += len;
    Ok(&message[*head - len..*head])
}

impl std::fmt::Debug for HandshakeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandshakeState")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Action, HandshakeState, NoiseError, ProtocolId, Role};
    use ne_crypto::RandomState;

    fn pair(name: &str) -> (HandshakeState, HandshakeState) {
        let id: ProtocolId = name.parse().unwrap();
        (
            HandshakeState::with_random_state(id, Role::Initiator, RandomState::from_seed([1; 32])),
            HandshakeState::with_random_state(id, Role::Responder, RandomState::from_seed([2; 32])),
        )
    }

    #[test]
    fn nothing_runs_before_start() {
        let (mut initiator, mut responder) = pair("Noise_NN_25519_ChaChaPoly_BLAKE2s");
        assert_eq!(initiator.action(), Action::None);
        assert_eq!(initiator.write_message(b""), Err(NoiseError::InvalidState));
        assert_eq!(responder.read_message(b""), Err(NoiseError::InvalidState));
        // Entry checks do not fail the handshake.
        assert_eq!(initiator.action(), Action::None);

        initiator.start().unwrap();
        responder.start().unwrap();
        assert_eq!(initiator.action(), Action::WriteMessage);
        assert_eq!(responder.action(), Action::ReadMessage);
        assert_eq!(initiator.start(), Err(NoiseError::InvalidState));
        assert_eq!(initiator.set_prologue(b"late"), Err(NoiseError::InvalidState));
    }

    #[test]
    fn missing_requirements_are_reported_at_start() {
        let (mut initiator, mut responder) = pair("Noise_NK_25519_ChaChaPoly_BLAKE2s");
        assert!(initiator.needs_remote_public_key());
        assert!(!initiator.needs_local_keypair());
        assert_eq!(initiator.start(), Err(NoiseError::RemoteKeyRequired));
        assert!(responder.needs_local_keypair());
        assert_eq!(responder.start(), Err(NoiseError::LocalKeyRequired));
        assert_eq!(responder.action(), Action::None);

        let (mut initiator, _) = pair("NoisePSK_NN_25519_ChaChaPoly_BLAKE2s");
        assert!(initiator.needs_pre_shared_key());
        assert_eq!(initiator.start(), Err(NoiseError::PskRequired));
    }

    #[test]
    fn pre_shared_key_rules() {
        let (mut plain, _) = pair("Noise_NN_25519_ChaChaPoly_BLAKE2s");
        assert_eq!(plain.set_pre_shared_key(&[0; 32]), Err(NoiseError::NotApplicable));

        let (mut psk, _) = pair("NoisePSK_NN_25519_ChaChaPoly_BLAKE2s");
        assert_eq!(psk.set_pre_shared_key(&[0; 31]), Err(NoiseError::InvalidLength));
        psk.set_pre_shared_key(&[7; 32]).unwrap();
        assert!(!psk.needs_pre_shared_key());
        assert_eq!(psk.set_pre_shared_key(&[7; 32]), Err(NoiseError::InvalidState));
        // The implicit empty prologue has already been mixed.
        assert_eq!(psk.set_prologue(b"p"), Err(NoiseError::InvalidState));
        psk.start().unwrap();
    }

    #[test]
    fn key_slots_follow_the_pattern() {
        let (mut initiator, mut responder) = pair("Noise_NN_25519_ChaChaPoly_BLAKE2s");
        assert!(initiator.local_keypair_mut().is_none());
        assert!(responder.remote_public_key_mut().is_none());

        let (mut initiator, mut responder) = pair("Noise_XX_448_AESGCM_SHA256");
        assert!(initiator.local_keypair_mut().is_some());
        // Learned during the handshake, not supplied up front.
        assert!(responder.remote_public_key_mut().is_none());
        assert!(responder.remote_public_key().is_none());
    }

    #[test]
    fn failure_is_terminal() {
        let (mut initiator, mut responder) = pair("Noise_NN_25519_ChaChaPoly_BLAKE2s");
        initiator.start().unwrap();
        responder.start().unwrap();
        let message = initiator.write_message(b"").unwrap();

        assert_eq!(responder.read_message(&message[..10]), Err(NoiseError::InvalidLength));
        assert_eq!(responder.action(), Action::Failed);
        assert_eq!(responder.read_message(&message), Err(NoiseError::InvalidState));
        assert_eq!(responder.write_message(b""), Err(NoiseError::InvalidState));
        assert!(responder.split().is_err());
    }

    #[test]
    fn oversized_payload_is_rejected_up_front() {
        let (mut initiator, _) = pair("Noise_NN_25519_ChaChaPoly_BLAKE2s");
        initiator.start().unwrap();
        let payload = vec![0u8; crate::MAX_MESSAGE_LEN + 1];
        assert_eq!(initiator.write_message(&payload), Err(NoiseError::InvalidLength));
        assert_eq!(initiator.action(), Action::WriteMessage);

        // Fits as a payload, but not once the ephemeral key is prepended.
        let payload = vec![0u8; crate::MAX_MESSAGE_LEN];
        assert_eq!(initiator.write_message(&payload), Err(NoiseError::InvalidLength));
        assert_eq!(initiator.action(), Action::Failed);
    }

    #[test]
    fn fallback_preconditions() {
        let (mut initiator, mut responder) = pair("Noise_IK_25519_ChaChaPoly_BLAKE2s");
        assert_eq!(initiator.fallback(), Err(NoiseError::InvalidState));
        assert_eq!(responder.fallback(), Err(NoiseError::InvalidState));
    }
}
