use std::ops::BitOr;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum HandshakeToken {
    /// Static key
    S,
    /// Ephemeral key
    E,
    /// Ephemeral-ephemeral DH
    DhEE,
    /// Ephemeral-static DH (initiator's ephemeral with responder's static)
    DhES,
    /// Static-ephemeral DH (initiator's static with responder's ephemeral)
    DhSE,
    /// Static-static DH
    DhSS,
    /// End of the current message, the other party continues
    FlipDir,
    /// End of the pattern
    End,
}

/// Pattern pre-conditions, seen from the initiator's side.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PatternFlags(u8);

impl PatternFlags {
    pub const NONE: Self = Self(0);
    /// The local party has a static keypair
    pub const LOCAL_STATIC: Self = Self(1 << 0);
    /// The local party generates an ephemeral keypair
    pub const LOCAL_EPHEMERAL: Self = Self(1 << 1);
    /// The local static public key is known to the remote party in advance
    pub const LOCAL_REQUIRED: Self = Self(1 << 2);
    /// The local ephemeral public key is known to the remote party in advance
    pub const LOCAL_EPHEM_REQ: Self = Self(1 << 3);
    pub const REMOTE_STATIC: Self = Self(1 << 4);
    pub const REMOTE_EPHEMERAL: Self = Self(1 << 5);
    pub const REMOTE_REQUIRED: Self = Self(1 << 6);
    pub const REMOTE_EPHEM_REQ: Self = Self(1 << 7);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Swaps the local and remote halves, giving the responder's view.
    pub const fn reverse(self) -> Self {
        Self(self.0.rotate_left(4))
    }

    const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl BitOr for PatternFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.or(rhs)
    }
}

/// Swaps the local and remote flag bits of a raw flag byte.
pub const fn reverse_flags(flags: u8) -> u8 {
    PatternFlags::from_bits(flags).reverse().bits()
}

use HandshakeToken::{DhEE, DhES, DhSE, DhSS, End, FlipDir, E, S};

const LS: PatternFlags = PatternFlags::LOCAL_STATIC;
const LE: PatternFlags = PatternFlags::LOCAL_EPHEMERAL;
const LR: PatternFlags = PatternFlags::LOCAL_REQUIRED;
const LER: PatternFlags = PatternFlags::LOCAL_EPHEM_REQ;
const RS: PatternFlags = PatternFlags::REMOTE_STATIC;
const RE: PatternFlags = PatternFlags::REMOTE_EPHEMERAL;
const RR: PatternFlags = PatternFlags::REMOTE_REQUIRED;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default)]
pub enum HandshakePattern {
    /// One-way, anonymous sender to a known recipient
    N,
    /// One-way, sender known to the recipient in advance
    K,
    /// One-way, sender transmits its static key
    X,
    /// No Authentication, no static keys (anonymous)
    #[default]
    NN,
    /// Initiator knows responder static, only responder authenticated
    NK,
    /// Initiator anonymous, responder transmits static
    NX,
    /// Initiator transmits static, responder anonymous
    XN,
    /// Authenticates responder, initiator transmits static
    XK,
    /// Mutual authentication, both statics transmitted
    XX,
    /// Responder knows initiator static, only initiator authenticated
    KN,
    /// Mutual static key authentication
    KK,
    /// Responder knows initiator static, responder transmits static
    KX,
    /// Initiator static sent in the clear with the first message
    IN,
    /// Initiator static sent encrypted to the known responder static
    IK,
    /// Initiator static sent in the clear, responder transmits static
    IX,
    /// XX resumed after a failed first message, reusing the initiator's ephemeral
    XXfallback,
}

impl HandshakePattern {
    pub const ALL: [HandshakePattern; 16] = [
        HandshakePattern::N,
        HandshakePattern::K,
        HandshakePattern::X,
        HandshakePattern::NN,
        HandshakePattern::NK,
        HandshakePattern::NX,
        HandshakePattern::XN,
        HandshakePattern::XK,
        HandshakePattern::XX,
        HandshakePattern::KN,
        HandshakePattern::KK,
        HandshakePattern::KX,
        HandshakePattern::IN,
        HandshakePattern::IK,
        HandshakePattern::IX,
        HandshakePattern::XXfallback,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HandshakePattern::N => "N",
            HandshakePattern::K => "K",
            HandshakePattern::X => "X",
            HandshakePattern::NN => "NN",
            HandshakePattern::NK => "NK",
            HandshakePattern::NX => "NX",
            HandshakePattern::XN => "XN",
            HandshakePattern::XK => "XK",
            HandshakePattern::XX => "XX",
            HandshakePattern::KN => "KN",
            HandshakePattern::KK => "KK",
            HandshakePattern::KX => "KX",
            HandshakePattern::IN => "IN",
            HandshakePattern::IK => "IK",
            HandshakePattern::IX => "IX",
            HandshakePattern::XXfallback => "XXfallback",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Flags from the initiator's point of view.
    pub fn flags(&self) -> PatternFlags {
        match self {
            HandshakePattern::N => LE | RS | RR,
            HandshakePattern::K => LS | LE | LR | RS | RR,
            HandshakePattern::X => LS | LE | RS | RR,
            HandshakePattern::NN => LE | RE,
            HandshakePattern::NK => LE | RS | RE | RR,
            HandshakePattern::NX => LE | RS | RE,
            HandshakePattern::XN => LS | LE | RE,
            HandshakePattern::XK => LS | LE | RS | RE | RR,
            HandshakePattern::XX => LS | LE | RS | RE,
            HandshakePattern::KN => LS | LE | LR | RE,
            HandshakePattern::KK => LS | LE | LR | RS | RE | RR,
            HandshakePattern::KX => LS | LE | LR | RS | RE,
            HandshakePattern::IN => LS | LE | RE,
            HandshakePattern::IK => LS | LE | RS | RE | RR,
            HandshakePattern::IX => LS | LE | RS | RE,
            HandshakePattern::XXfallback => LS | LE | LER | RS | RE,
        }
    }

    /// Flags as seen by the given side.
    pub fn flags_for(&self, initiator: bool) -> PatternFlags {
        match initiator {
            true => self.flags(),
            false => self.flags().reverse(),
        }
    }

    /// The token stream. `FlipDir` separates messages and `End` terminates the pattern.
    pub fn tokens(&self) -> &'static [HandshakeToken] {
        match self {
            HandshakePattern::N => &[E, DhES, End],
            HandshakePattern::K => &[E, DhES, DhSS, End],
            HandshakePattern::X => &[E, DhES, S, DhSS, End],
            HandshakePattern::NN => &[E, FlipDir, E, DhEE, End],
            HandshakePattern::NK => &[E, DhES, FlipDir, E, DhEE, End],
            HandshakePattern::NX => &[E, FlipDir, E, DhEE, S, DhES, End],
            HandshakePattern::XN => &[E, FlipDir, E, DhEE, FlipDir, S, DhSE, End],
            HandshakePattern::XK => &[E, DhES, FlipDir, E, DhEE, FlipDir, S, DhSE, End],
            HandshakePattern::XX => &[E, FlipDir, E, DhEE, S, DhES, FlipDir, S, DhSE, End],
            HandshakePattern::KN => &[E, FlipDir, E, DhEE, DhSE, End],
            HandshakePattern::KK => &[E, DhES, DhSS, FlipDir, E, DhEE, DhSE, End],
            HandshakePattern::KX => &[E, FlipDir, E, DhEE, DhSE, S, DhES, End],
            HandshakePattern::IN => &[E, S, FlipDir, E, DhEE, DhSE, End],
            HandshakePattern::IK => &[E, DhES, S, DhSS, FlipDir, E, DhEE, DhSE, End],
            HandshakePattern::IX => &[E, S, FlipDir, E, DhEE, DhSE, S, DhES, End],
            HandshakePattern::XXfallback => &[FlipDir, E, DhEE, S, DhES, FlipDir, S, DhSE, End],
        }
    }

    /// Only the initiator ever sends.
    pub fn is_one_way(&self) -> bool {
        !self.tokens().contains(&FlipDir)
    }

    /// Patterns that resume from an ephemeral key already sent by the initiator.
    pub fn is_fallback(&self) -> bool {
        self.flags().contains(PatternFlags::LOCAL_EPHEM_REQ)
            || self.flags().contains(PatternFlags::REMOTE_EPHEM_REQ)
    }
}
