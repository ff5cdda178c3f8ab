use ctor_bytecode::TypeKind;

pub const BOXING_METHOD: &str = "valueOf";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxingIdiom {
    pub primitive: &'static str,
    pub wrapper: &'static str,
    pub unbox: &'static str,
}

pub const BOXING_IDIOMS: [BoxingIdiom; 8] = [
    BoxingIdiom {
        primitive: "boolean",
        wrapper: "java.lang.Boolean",
        unbox: "booleanValue",
    },
    BoxingIdiom {
        primitive: "byte",
        wrapper: "java.lang.Byte",
        unbox: "byteValue",
    },
    BoxingIdiom {
        primitive: "char",
        wrapper: "java.lang.Character",
        unbox: "charValue",
    },
    BoxingIdiom {
        primitive: "short",
        wrapper: "java.lang.Short",
        unbox: "shortValue",
    },
    BoxingIdiom {
        primitive: "int",
        wrapper: "java.lang.Integer",
        unbox: "intValue",
    },
    BoxingIdiom {
        primitive: "long",
        wrapper: "java.lang.Long",
        unbox: "longValue",
    },
    BoxingIdiom {
        primitive: "float",
        wrapper: "java.lang.Float",
        unbox: "floatValue",
    },
    BoxingIdiom {
        primitive: "double",
        wrapper: "java.lang.Double",
        unbox: "doubleValue",
    },
];

/// Looks up a wrapper class given in dotted or internal (`/`) form.
pub fn idiom_for_wrapper(class_name: &str) -> Option<&'static BoxingIdiom> {
    BOXING_IDIOMS.iter().find(|idiom| {
        idiom.wrapper.len() == class_name.len()
            && idiom
                .wrapper
                .bytes()
                .zip(class_name.bytes())
                .all(|(a, b)| a == b || (a == b'.' && b == b'/'))
    })
}

pub fn is_boxing_call(owner: &str, name: &str) -> bool {
    name == BOXING_METHOD && idiom_for_wrapper(owner).is_some()
}

/// True if `accessor` unboxes a value of `kind`, e.g. `intValue` on `Integer`.
pub fn is_unboxing_call(kind: &TypeKind, accessor: &str) -> bool {
    kind.class_name()
        .and_then(idiom_for_wrapper)
        .is_some_and(|idiom| idiom.unbox == accessor)
}
