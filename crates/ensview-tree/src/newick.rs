//! Newick reader and writer
//!
//! Grammar:
//! ```text
//! tree     := subtree ';'?
//! subtree  := ('(' subtree (',' subtree)* ')')? label? (':' number)?
//! label    := quoted | unquoted
//! ```
//! Whitespace and `[...]` comments may appear between tokens.

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_while1},
    character::complete::{char, multispace1, none_of},
    combinator::{map, opt, value},
    multi::{many0, separated_list1},
    number::complete::double,
    sequence::{delimited, pair, preceded},
    IResult,
};

use crate::error::{TreeError, TreeResult};
use crate::tree::{Clade, NodeId, Tree};

/// Characters that force a label to be quoted
const SPECIAL: &[char] = &['(', ')', '[', ']', '\'', ':', ';', ','];

struct NewickNode {
    name: Option<String>,
    length: Option<f64>,
    children: Vec<NewickNode>,
}

impl Tree {
    /// Parse a tree from Newick text
    pub fn from_newick(text: &str) -> TreeResult<Tree> {
        match newick(text) {
            Ok((rest, node)) if rest.trim().is_empty() => {
                let mut tree = Tree::default();
                insert(&mut tree, None, node);
                Ok(tree)
            }
            Ok((rest, _)) => Err(TreeError::Newick {
                position: text.len() - rest.len(),
                message: format!("unexpected trailing input '{}'", rest.trim()),
            }),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(TreeError::Newick {
                position: text.len() - e.input.len(),
                message: format!("{:?}", e.code),
            }),
            Err(nom::Err::Incomplete(_)) => Err(TreeError::Newick {
                position: text.len(),
                message: "unexpected end of input".to_string(),
            }),
        }
    }

    /// Serialize the tree as Newick text terminated by `;`
    pub fn to_newick(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.root() {
            write_clade(self, root, &mut out);
        }
        out.push(';');
        out
    }
}

fn insert(tree: &mut Tree, parent: Option<NodeId>, node: NewickNode) {
    let id = tree.add_clade(
        parent,
        Clade {
            name: node.name,
            branch_length: node.length,
            ..Default::default()
        },
    );
    for child in node.children {
        insert(tree, Some(id), child);
    }
}

fn write_clade(tree: &Tree, id: NodeId, out: &mut String) {
    let clade = tree.clade(id);
    if !clade.children.is_empty() {
        out.push('(');
        for (i, child) in clade.children.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            write_clade(tree, *child, out);
        }
        out.push(')');
    }
    if let Some(name) = &clade.name {
        if name.contains(SPECIAL) || name.contains(char::is_whitespace) {
            out.push('\'');
            out.push_str(&name.replace('\'', "''"));
            out.push('\'');
        } else {
            out.push_str(name);
        }
    }
    if let Some(length) = clade.branch_length {
        out.push(':');
        out.push_str(&length.to_string());
    }
}

/// Skip whitespace and bracketed comments
fn skip(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((
            value((), multispace1),
            value((), delimited(char('['), opt(is_not("]")), char(']'))),
        ))),
    )(input)
}

fn quoted_label(input: &str) -> IResult<&str, String> {
    delimited(
        char('\''),
        map(
            many0(alt((value('\'', tag("''")), none_of("'")))),
            |chars: Vec<char>| chars.into_iter().collect(),
        ),
        char('\''),
    )(input)
}

fn unquoted_label(input: &str) -> IResult<&str, String> {
    map(
        take_while1(|c: char| !SPECIAL.contains(&c) && !c.is_whitespace()),
        str::to_string,
    )(input)
}

fn branch_length(input: &str) -> IResult<&str, f64> {
    preceded(pair(char(':'), skip), double)(input)
}

fn subtree(input: &str) -> IResult<&str, NewickNode> {
    let (input, _) = skip(input)?;
    let (input, children) = opt(delimited(
        char('('),
        separated_list1(char(','), subtree),
        char(')'),
    ))(input)?;
    let (input, _) = skip(input)?;
    let (input, name) = opt(alt((quoted_label, unquoted_label)))(input)?;
    let (input, _) = skip(input)?;
    let (input, length) = opt(branch_length)(input)?;
    let (input, _) = skip(input)?;

    Ok((
        input,
        NewickNode {
            name,
            length,
            children: children.unwrap_or_default(),
        },
    ))
}

fn newick(input: &str) -> IResult<&str, NewickNode> {
    let (input, node) = subtree(input)?;
    let (input, _) = opt(char(';'))(input)?;
    Ok((input, node))
}
