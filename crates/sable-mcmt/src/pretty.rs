//! Text renderer for the MCMT AST.

use crate::{McmtFile, Query, StateFormula, StateType, System, Term, Transition};
use sable_model::Name;
use std::fmt::Write;

/// Render a file to MCMT text. `debug` adds `;;` comment headers and
/// changes nothing else.
pub fn render(file: &McmtFile, debug: bool) -> String {
    let mut r = Renderer {
        out: String::new(),
        debug,
    };
    r.file(file);
    r.out
}

struct Renderer {
    out: String,
    debug: bool,
}

impl Renderer {
    fn comment(&mut self, text: &str) {
        if self.debug {
            let _ = writeln!(self.out, ";; {}", text);
        }
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn file(&mut self, file: &McmtFile) {
        for (i, c) in file.consts.iter().enumerate() {
            if i > 0 {
                self.blank();
            }
            let _ = write!(self.out, "(define-constant {} ", c.name);
            self.term(&c.value);
            self.out.push_str(")\n");
        }
        if !file.consts.is_empty() {
            self.blank();
        }

        self.comment("state type");
        self.state_type(&file.state_type);
        self.blank();

        self.comment("initial states");
        self.state_formula(&file.init);
        self.blank();

        self.comment("fault assumptions");
        self.state_formula(&file.assumptions);

        for t in &file.transitions {
            self.blank();
            self.comment(&format!("transition {}", t.name));
            self.transition(t);
        }

        self.blank();
        self.comment("master transition");
        self.transition(&file.master);

        self.blank();
        self.system(&file.system);

        for q in &file.queries {
            self.blank();
            self.comment(&format!("query: {}", q.name));
            self.query(q);
        }
    }

    fn state_type(&mut self, st: &StateType) {
        let _ = writeln!(self.out, "(define-state-type {}", st.name);
        self.out.push_str("  (");
        self.var_list(&st.state_vars);
        self.out.push_str(")\n  (");
        self.var_list(&st.input_vars);
        self.out.push_str("))\n");
    }

    fn var_list(&mut self, vars: &[(Name, crate::Sort)]) {
        for (i, (name, sort)) in vars.iter().enumerate() {
            if i > 0 {
                self.out.push(' ');
            }
            let _ = write!(self.out, "({} {})", name, sort);
        }
    }

    fn state_formula(&mut self, sf: &StateFormula) {
        let _ = writeln!(self.out, "(define-states {} {}", sf.name, sf.state_type);
        self.pred(&sf.pred, 2);
        self.out.push_str(")\n");
    }

    fn transition(&mut self, t: &Transition) {
        let _ = writeln!(self.out, "(define-transition {} {}", t.name, t.state_type);
        if t.lets.is_empty() {
            self.pred(&t.pred, 2);
            self.out.push_str(")\n");
            return;
        }
        self.out.push_str("  (let\n    (");
        for (i, (name, term)) in t.lets.iter().enumerate() {
            if i > 0 {
                self.out.push_str("\n     ");
            }
            let _ = write!(self.out, "({} ", name);
            self.term(term);
            self.out.push(')');
        }
        self.out.push_str(")\n");
        self.pred(&t.pred, 4);
        self.out.push_str("))\n");
    }

    fn system(&mut self, s: &System) {
        let _ = writeln!(self.out, "(define-transition-system {}", s.name);
        let _ = writeln!(self.out, "  {}", s.state_type);
        let _ = writeln!(self.out, "  {}", s.init);
        let _ = writeln!(self.out, "  {})", s.transition);
    }

    fn query(&mut self, q: &Query) {
        let _ = writeln!(self.out, "(query {}", q.system);
        self.pred(&q.pred, 2);
        self.out.push_str(")\n");
    }

    /// A predicate in statement position: conjunctions go one conjunct per
    /// line, everything else renders inline at the given indent.
    fn pred(&mut self, pred: &Term, indent: usize) {
        let pad = " ".repeat(indent);
        match pred {
            Term::And(conjuncts) => {
                let _ = write!(self.out, "{}(and", pad);
                for c in conjuncts {
                    let _ = write!(self.out, "\n{}  ", pad);
                    self.term(c);
                }
                self.out.push(')');
            }
            other => {
                self.out.push_str(&pad);
                self.term(other);
            }
        }
    }

    /// Inline term rendering.
    fn term(&mut self, term: &Term) {
        match term {
            Term::True => self.out.push_str("true"),
            Term::False => self.out.push_str("false"),
            Term::Int(n) => {
                if *n < 0 {
                    let _ = write!(self.out, "(- {})", n.unsigned_abs());
                } else {
                    let _ = write!(self.out, "{}", n);
                }
            }
            Term::Real(r) => {
                if r.is_sign_negative() {
                    let _ = write!(self.out, "(- {:?})", -r);
                } else {
                    let _ = write!(self.out, "{:?}", r);
                }
            }
            Term::State(n) => {
                let _ = write!(self.out, "state.{}", n);
            }
            Term::Next(n) => {
                let _ = write!(self.out, "next.{}", n);
            }
            Term::Ref(n) => {
                let _ = write!(self.out, "{}", n);
            }
            Term::Not(t) => self.app("not", std::slice::from_ref(t)),
            Term::And(ts) => self.app("and", ts),
            Term::Or(ts) => self.app("or", ts),
            Term::Implies(a, b) => self.app2("=>", a, b),
            Term::Eq(a, b) => self.app2("=", a, b),
            Term::Lt(a, b) => self.app2("<", a, b),
            Term::Le(a, b) => self.app2("<=", a, b),
            Term::Add(ts) => self.app("+", ts),
            Term::Sub(a, b) => self.app2("-", a, b),
            Term::Mul(a, b) => self.app2("*", a, b),
            Term::Ite(c, t, e) => {
                self.out.push_str("(ite ");
                self.term(c);
                self.out.push(' ');
                self.term(t);
                self.out.push(' ');
                self.term(e);
                self.out.push(')');
            }
            Term::Let(bindings, body) => {
                self.out.push_str("(let (");
                for (i, (name, value)) in bindings.iter().enumerate() {
                    if i > 0 {
                        self.out.push(' ');
                    }
                    let _ = write!(self.out, "({} ", name);
                    self.term(value);
                    self.out.push(')');
                }
                self.out.push_str(") ");
                self.term(body);
                self.out.push(')');
            }
        }
    }

    fn app(&mut self, op: &str, args: &[Term]) {
        let _ = write!(self.out, "({}", op);
        for a in args {
            self.out.push(' ');
            self.term(a);
        }
        self.out.push(')');
    }

    fn app2(&mut self, op: &str, a: &Term, b: &Term) {
        let _ = write!(self.out, "({} ", op);
        self.term(a);
        self.out.push(' ');
        self.term(b);
        self.out.push(')');
    }
}
